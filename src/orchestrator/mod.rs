//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责页面分区、并发扇出和结果折叠，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `partition` - 分区器
//! - 把页面序列切成连续、不重叠、保持顺序的分区
//!
//! ### `map_reduce` - 递归编排器
//! - 判断节点走 map 还是扇出
//! - 每个扇出节点用 `JoinSet` 并发递归子分区
//! - 按分区顺序收集结果，交给 reduce 服务
//! - 统计 map / reduce 调用数和递归深度
//!
//! ## 层次关系
//!
//! ```text
//! workflow::QueryFlow (处理一次查询)
//!     ↓
//! map_reduce (递归处理页面序列)
//!     ↓
//! services (能力层：map / reduce)
//!     ↓
//! clients (LanguageModel)
//! ```
//!
//! ## 设计原则
//!
//! 1. **顺序不变**：并发不改变结果顺序
//! 2. **没有结果不是错误**：`Absent` 作为普通值逐层传递
//! 3. **错误不吞掉**：LLM 调用失败总是向上传播

pub mod map_reduce;
pub mod partition;

// 重新导出主要类型
pub use map_reduce::{MapReduce, MapReduceOutcome, MapReduceSettings, MapReduceStats};
pub use partition::partition_bounds;
