// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持印尼语（默认，面向小微食品工坊用户）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"id" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use fnb_costing::i18n::t;
/// let msg = t("alert.cost_increase.title");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use fnb_costing::i18n::t_with_args;
/// let msg = t_with_args("alert.cost_increase.message", &[("name", "Tepung Terigu")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_messages() {
        set_locale("id");
        let title = t("alert.cost_increase.title");
        assert!(!title.is_empty());
        assert!(!title.starts_with("alert."));
    }

    #[test]
    fn test_t_with_args_replaces_placeholders() {
        set_locale("id");
        let msg = t_with_args(
            "alert.cost_increase.message",
            &[
                ("name", "Gula Pasir"),
                ("pct", "16.7"),
                ("old", "1200"),
                ("new", "1400"),
                ("count", "2"),
            ],
        );
        assert!(msg.contains("Gula Pasir"));
        assert!(!msg.contains("%{name}"));
    }
}
