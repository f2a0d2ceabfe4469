//! 评论路由规则引擎
//!
//! 对每条直播评论/礼物消息进行规则评估，决定哪些 OSC 端点接收哪些字段：
//! - 点号路径字段读取与投影
//! - 条件评估（带数据类型转换）
//! - 平台/消息类型选择器 + 条件组
//! - 规则集处理与默认路由判定
//! - 规则持久化与有序存储

pub mod coerce;
pub mod compiler;
pub mod detector;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod path;
pub mod processor;
pub mod projector;
pub mod repository;
pub mod store;

pub use compiler::{CompiledCondition, CompiledGroup, CompiledRule, RuleCompiler, RuleMatcher};
pub use detector::{Source, SourceDetector};
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use executor::RuleExecutor;
pub use models::{
    Action, ActionType, Condition, ConditionGroup, EvaluationResult, FieldSpec, RuleDefinition,
    RuleSetResult,
};
pub use operators::{DataType, LogicalOperator, Operator};
pub use processor::RuleSetProcessor;
pub use projector::FieldProjector;
pub use repository::{FileRuleRepository, InMemoryRuleRepository, RuleRepository};
pub use store::{RuleStore, RuleStoreStats};
