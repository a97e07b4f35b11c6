// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tld::normalize_tld;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 从区域文件文本中提取二级标签
///
/// 每个非空且不以 `;` 开头的行取第一个空白分隔字段，去掉末尾的点并转小写，
/// 仅当最后一段等于顶级域名时保留其前一段作为二级标签。
/// 顶级域名本身的记录不会产生标签，无法解析的行直接跳过。
///
/// # 参数
///
/// * `text` - 区域文件全文
/// * `tld` - 顶级域名
///
/// # 返回值
///
/// 去重后的小写二级标签集合
pub fn extract_labels(text: &str, tld: &str) -> HashSet<String> {
    let tld = normalize_tld(tld);
    let labels: HashSet<String> = text
        .lines()
        .filter_map(|line| label_from_line(line, &tld))
        .collect();

    if labels.is_empty() {
        warn!(tld = %tld, "Zone snapshot yielded no labels");
    }
    labels
}

/// 分块提取二级标签
///
/// 与 [`extract_labels`] 语义一致，但每新增 `chunk_size` 个标签让出一次运行时，
/// 避免超大区域文件长时间占用执行线程
pub async fn extract_labels_chunked(text: &str, tld: &str, chunk_size: usize) -> HashSet<String> {
    let tld = normalize_tld(tld);
    let chunk_size = chunk_size.max(1);
    let mut labels = HashSet::new();
    let mut since_yield = 0usize;

    for line in text.lines() {
        if let Some(label) = label_from_line(line, &tld) {
            if labels.insert(label) {
                since_yield += 1;
                if since_yield >= chunk_size {
                    since_yield = 0;
                    debug!(tld = %tld, parsed = labels.len(), "Zone parse progress");
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    if labels.is_empty() {
        warn!(tld = %tld, "Zone snapshot yielded no labels");
    }
    labels
}

/// 拼接完整域名
pub fn build_domain_name(label: &str, tld: &str) -> String {
    format!("{}.{}", label.to_lowercase(), normalize_tld(tld))
}

fn label_from_line(line: &str, tld: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
        return None;
    }

    let owner = line.split_whitespace().next()?;
    let owner = owner.strip_suffix('.').unwrap_or(owner).to_lowercase();

    let mut parts = owner.rsplit('.');
    if parts.next()? != tld {
        return None;
    }
    let sld = parts.next()?;
    if sld.is_empty() {
        return None;
    }
    Some(sld.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ZONE: &str = "\
; zone snapshot for com
$ORIGIN com.
com.            86400 IN SOA a.gtld-servers.net. nstld.verisign-grs.com. 1 2 3 4 5
ALPHA.com.      172800 IN NS ns1.alpha.net.
alpha.com.      172800 IN NS ns2.alpha.net.
beta.com.       172800 IN NS ns1.beta.net.
ns1.gamma.com.  172800 IN A 192.0.2.1
gamma.com       172800 IN NS ns1.gamma.com.
other.org.      172800 IN NS ns1.other.org.

   ; indented comment
..com. 172800 IN NS broken.
";

    #[test]
    fn test_extract_labels_dedups_and_lowercases() {
        let labels = extract_labels(SAMPLE_ZONE, "com");

        let expected: HashSet<String> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_extract_labels_normalizes_tld_argument() {
        let labels = extract_labels(SAMPLE_ZONE, ".COM");
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_apex_and_foreign_records_are_ignored() {
        let labels = extract_labels("com. 86400 IN SOA x\nfoo.net. 1 IN NS y\n", "com");
        assert!(labels.is_empty());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(extract_labels("", "com").is_empty());
        assert!(extract_labels("\n\n;only comments\n", "com").is_empty());
    }

    #[tokio::test]
    async fn test_chunked_matches_plain_parse() {
        let mut text = String::new();
        for i in 0..250 {
            text.push_str(&format!("label{}.io. 3600 IN NS ns.example.\n", i));
            text.push_str(&format!("label{}.io. 3600 IN NS ns2.example.\n", i));
        }

        let chunked = extract_labels_chunked(&text, "io", 7).await;
        let plain = extract_labels(&text, "io");

        assert_eq!(chunked.len(), 250);
        assert_eq!(chunked, plain);
    }

    #[test]
    fn test_build_domain_name() {
        assert_eq!(build_domain_name("Beta", ".com"), "beta.com");
        assert_eq!(build_domain_name("shop", "io"), "shop.io");
    }
}
