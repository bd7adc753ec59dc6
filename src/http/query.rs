// 查询参数

/// 有序查询参数表
///
/// 值为 `None` 的参数会被保留在表中，但不会出现在最终 URL 里
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加参数，值取其字符串形式
    pub fn push<V: ToString>(mut self, key: impl Into<String>, value: V) -> Self {
        self.entries.push((key.into(), Some(value.to_string())));
        self
    }

    /// 追加可选参数，`None` 在构造 URL 时被跳过
    pub fn push_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.entries
            .push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// 实际会发送的参数（按插入顺序）
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for QueryParams
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (k, v)| params.push_opt(k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_none_values_are_skipped() {
        let params = QueryParams::new()
            .push("url", "https://youtu.be/x")
            .push_opt("limit", None::<u32>)
            .push_opt("format", Some("mp4"));

        let pairs: Vec<_> = params.pairs().collect();
        assert_eq!(pairs, vec![("url", "https://youtu.be/x"), ("format", "mp4")]);
    }

    #[test]
    fn test_all_none_is_empty() {
        let params: QueryParams = vec![("a", None::<i32>), ("b", None)].into_iter().collect();
        assert!(params.is_empty());
    }

    proptest! {
        #[test]
        fn prop_pairs_match_present_values(
            entries in proptest::collection::vec(("[a-z]{1,8}", proptest::option::of(any::<i64>())), 0..12)
        ) {
            let params: QueryParams = entries.iter().cloned().collect();
            let expected: Vec<(String, String)> = entries
                .iter()
                .filter_map(|(k, v)| v.map(|v| (k.clone(), v.to_string())))
                .collect();
            let actual: Vec<(String, String)> = params
                .pairs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
