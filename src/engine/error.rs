// ==========================================
// 食品工坊经营系统 - 引擎层错误类型
// ==========================================
// 错误口径:
// - InvalidInput / NotFound / InvalidServings 直接返回调用方,不自动重试
// - 空配方与历史不足不是错误（分别用零成本标记与空列表表达）
// - 存储错误原样向上传递,不吞不重试
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum CostingError {
    // ===== 输入校验错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效份数: recipe_id={recipe_id}, servings={servings}")]
    InvalidServings { recipe_id: String, servings: i64 },

    // ===== 引用错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type CostingResult<T> = Result<T, CostingError>;
