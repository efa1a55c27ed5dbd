//! Price services - headline price and converter rates.

mod converter_service;
mod headline_service;
mod prices_model;
mod prices_traits;

pub use converter_service::ConverterPriceService;
pub use headline_service::HeadlinePriceService;
pub use prices_model::{ConverterPrice, PriceStatus, RateFreshness};
pub use prices_traits::{ConverterPriceServiceTrait, HeadlinePriceServiceTrait};
