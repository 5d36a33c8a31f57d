//! 搜索查询归一化
//!
//! 独立抽取的字段拼接后经常重复词（如 craft 和 query 都含 "knitting"），
//! 重复词会拉低搜索相关性，所以查找前必须去重：按词粒度、大小写不敏感，
//! 保留首次出现及其原始大小写，顺序不变。

use std::collections::HashSet;

/// 将若干字段拼成一条去重后的搜索短语
pub fn normalize_query(fields: &[&str]) -> String {
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for field in fields {
        for word in field.split_whitespace() {
            if seen.insert(word.to_lowercase()) {
                words.push(word);
            }
        }
    }
    words.join(" ")
}
