pub mod client;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod school;
pub mod types;

pub use client::{RateMyProfClient, MAX_PAGES, PAGE_SIZE};
pub use error::ScraperError;
pub use normalize::normalize_teacher;
pub use pipeline::run_scrape;
pub use school::{decode_school_id, encode_school_id};
pub use types::{Page, PageInfo, TeacherNode};
