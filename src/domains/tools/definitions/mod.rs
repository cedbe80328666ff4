//! Tool definitions module.
//!
//! Each tool lives in its own file and knows how to describe itself
//! (`to_tool`), build its rmcp route (`create_route`) and serve HTTP calls
//! (`http_handler`).

pub mod budget_date;
pub mod common;
pub mod validate;

pub use budget_date::BudgetDateTool;
pub use validate::{ValidateParams, ValidateTool};
