//! The two scraping jobs.
//!
//! | Job | Module | Listing | Records |
//! |-----|--------|---------|---------|
//! | Business news | [`thestar`] | headless Chrome | one per article, exported to `DDMMYY.csv` |
//! | Foreign-born population | [`undata`] | paged HTTP table | one per matching table row |
//!
//! Both run strictly sequentially: every fetch completes before the next one
//! starts.

pub mod thestar;
pub mod undata;
