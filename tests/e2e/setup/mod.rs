//! 测试环境搭建

mod environment;

pub use environment::{TestEnvConfig, TestEnvironment};
