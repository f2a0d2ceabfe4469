//! 测试套件模块
//!
//! 按功能组织的测试用例集合。

pub mod default_routing;
pub mod failure_isolation;
pub mod history;
pub mod rule_routing;
pub mod settings;
