//! Shared fixtures for memberwise-map integration tests.

#![allow(dead_code)]

use memberwise_model::{member_enum, reflect};
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    #[default]
    Other,
    Test,
    Live,
}

member_enum!(Kind { Other, Test => "TEST", Live });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Source {
    pub id: i32,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    pub id: i32,
    pub value: String,
}

reflect!(Source { "ID" => id, "Value" => value });
reflect!(Target { "id" => id, "value" => value });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpperTarget {
    pub id: i32,
    pub value: String,
}

reflect!(UpperTarget { "ID" => id, "Value" => value });
