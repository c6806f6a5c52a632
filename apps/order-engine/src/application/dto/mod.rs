//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod order_dto;
mod position_dto;

pub use order_dto::{OrderDto, PlaceOrderDto};
pub use position_dto::PositionDto;
