pub mod coordinator;
pub mod dictionary;
pub mod etl;
pub mod extraction;
pub mod generator;
pub mod pipeline;
pub mod report;
pub mod scorer;

pub use crate::domain::model::{BatchReport, Candidate, ScoreRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Scorer, Storage};
pub use crate::utils::error::Result;
