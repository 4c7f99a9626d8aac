#![deny(clippy::all)]

pub mod api;
mod calendar;
mod datekey;
mod error;
mod grouping;
mod view;

pub use api::types::*;
pub use api::{StoreClient, DEFAULT_API_URL};
pub use calendar::*;
pub use datekey::*;
pub use error::{ApiError, ParseError};
pub use grouping::*;
pub use view::*;
