pub mod common;
pub mod domain;
pub mod modules;
pub mod support;

pub use domain::{
    Adf04Error, Adf04ErrorCategory, Adf04Result, Document, Header, LevelEntry, LevelTable,
    ParserResult, RateRecord, RateTable, TemperatureGrid, TermComposite, TransitionKey,
};
