pub mod converter;
pub mod csv_io;
pub mod etl;
pub mod lookup;
pub mod namer;
pub mod pipeline;
pub mod resolver;
pub mod transformer;

pub use crate::domain::model::{Record, Table, TransformResult};
pub use crate::domain::ports::{Clock, Pipeline, Storage, SystemClock};
pub use crate::utils::error::Result;
