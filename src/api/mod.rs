// ==========================================
// 食品工坊经营系统 - API 层
// ==========================================
// 职责: 对外业务接口,参数校验与错误转换
// 说明: HTTP/鉴权/响应整形属于外层边界,不在本层
// ==========================================

pub mod costing_api;
pub mod error;

// 重导出
pub use costing_api::{BatchCompileItem, BatchSnapshotItem, CostingApi, RecordPurchaseResult};
pub use error::{ApiError, ApiResult};
