//! map / reduce 两个阶段使用的提示词
//!
//! 两个系统提示词的职责不同（提取 vs 合并），不能混用。

/// map 阶段：从一组页面中提取与查询相关的内容
pub const MAP_SYSTEM_PROMPT: &str = r#"You are reading one group of pages taken from a larger document.
Your task is to extract the information on these pages that is relevant to the user's query. Focus on:
1. Main ideas and key points
2. Important facts, figures and quotations
3. Context that helps to understand the wider document

Write the result in a clear, structured form so it can later be combined with extracts from other pages.
Respond with the essential content only. Do not add meta-commentary about your process."#;

/// reduce 阶段：把多个已编号的片段合并为一个完整回答
pub const REDUCE_SYSTEM_PROMPT: &str = r#"You are combining several processed segments that all come from the same document.
Your task is to:
1. Merge overlapping or related information
2. Keep a logical progression between ideas
3. Remove redundancies while preserving every unique point
4. Make sure the combined result directly answers the user's query

Produce one cohesive synthesis that stays accurate and loses as little information as possible."#;

/// reduce 阶段片段之间的分隔符
pub const SEGMENT_SEPARATOR: &str = "\n###\n";

/// 构建 map 阶段的用户消息
pub fn build_map_message(query: &str, content: &str) -> String {
    format!(
        r#"Query: {}
Page content:
{}

Extract the information from these pages that helps to answer the query."#,
        query, content
    )
}

/// 构建 reduce 阶段的用户消息
///
/// 片段按传入顺序从 0 开始编号。
pub fn build_reduce_message<S: AsRef<str>>(query: &str, segments: &[S]) -> String {
    let context = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| format!("segment number {}:\n{}", index, segment.as_ref()))
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR);

    format!(
        r#"Query: {}
Segments:
{}

Combine these segments into a single response that answers the query. Keep all relevant information and drop the redundancies."#,
        query, context
    )
}
