//! 이모지 카탈로그.
//!
//! 두 이모지 세트를 보관한다.
//! - 기본 세트: 유니코드 이모지 데이터셋에서 시작 시 한 번 로드
//! - 워크스페이스 세트: 첫 커맨드 처리 시 채팅 플랫폼에서 조회, 이후 프로세스 수명 동안 유지
//!
//! 조회 시 기본 세트가 우선한다. 로드 실패 시 해당 세트는 비어 있는 채로 남고
//! 카탈로그는 계속 사용 가능하다.

use henrifai_core::error::CoreError;
use henrifai_core::models::emoji::{EmojiDataEntry, EmojiRepr};
use henrifai_core::ports::emoji_source::{EmojiDatasetSource, WorkspaceEmojiSource};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

type EmojiMap = HashMap<String, EmojiRepr>;

/// 카탈로그 로드 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStatus {
    /// 기본 세트 로드 여부
    pub baseline_loaded: bool,
    /// 기본 세트 항목 수
    pub baseline_len: usize,
    /// 워크스페이스 세트 로드 여부
    pub workspace_loaded: bool,
    /// 워크스페이스 세트 항목 수
    pub workspace_len: usize,
}

/// 이모지 카탈로그
#[derive(Debug, Default)]
pub struct EmojiCatalog {
    baseline: RwLock<Option<EmojiMap>>,
    workspace: RwLock<Option<EmojiMap>>,
}

impl EmojiCatalog {
    /// 빈 카탈로그 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 구성된 세트로 카탈로그 생성
    pub fn with_sets(baseline: EmojiMap, workspace: Option<EmojiMap>) -> Self {
        Self {
            baseline: RwLock::new(Some(baseline)),
            workspace: RwLock::new(workspace),
        }
    }

    /// 데이터셋 항목으로 기본 세트 구성
    ///
    /// 대표 `short_name`을 먼저 등록하고, 나머지 `short_names`는 비어 있는 이름에만 등록한다.
    pub fn build_baseline(entries: &[EmojiDataEntry]) -> EmojiMap {
        let mut map = EmojiMap::with_capacity(entries.len());

        for entry in entries {
            map.insert(
                entry.short_name.clone(),
                EmojiRepr::CharRef(char_ref(&entry.unified)),
            );
        }

        for entry in entries {
            for alias in &entry.short_names {
                map.entry(alias.clone())
                    .or_insert_with(|| EmojiRepr::CharRef(char_ref(&entry.unified)));
            }
        }

        map
    }

    /// 기본 세트 로드
    ///
    /// 실패 시 `CatalogLoad` 에러를 반환하고 기존 세트는 그대로 둔다.
    pub async fn load_baseline(&self, source: &dyn EmojiDatasetSource) -> Result<usize, CoreError> {
        let entries = source
            .fetch_entries()
            .await
            .map_err(|e| into_catalog_error("baseline", e))?;

        let map = Self::build_baseline(&entries);
        let count = map.len();
        *self.baseline.write() = Some(map);

        info!(entries = entries.len(), names = count, "기본 이모지 세트 로드");
        Ok(count)
    }

    /// 워크스페이스 세트가 없으면 조회
    ///
    /// 새로 로드했으면 `true`, 이미 로드되어 있으면 `false`.
    /// 동시에 호출되면 양쪽 모두 조회할 수 있으며 마지막 결과가 남는다 (내용 동일).
    pub async fn ensure_workspace_loaded(
        &self,
        source: &dyn WorkspaceEmojiSource,
    ) -> Result<bool, CoreError> {
        if self.workspace.read().is_some() {
            return Ok(false);
        }

        let raw = source
            .list_custom_emoji()
            .await
            .map_err(|e| into_catalog_error("workspace", e))?;

        let map: EmojiMap = raw
            .iter()
            .map(|(name, value)| (name.clone(), EmojiRepr::from_workspace_value(value)))
            .collect();
        let count = map.len();
        *self.workspace.write() = Some(map);

        info!(names = count, "워크스페이스 이모지 세트 로드");
        Ok(true)
    }

    /// 이름으로 표현 조회 (기본 세트 우선)
    ///
    /// 워크스페이스 별칭은 한 단계만 따라간다.
    pub fn resolve(&self, name: &str) -> Option<EmojiRepr> {
        match self.lookup(name)? {
            EmojiRepr::Alias(target) => match self.lookup(&target) {
                Some(EmojiRepr::Alias(_)) | None => {
                    debug!(name, target = %target, "별칭 대상 없음");
                    None
                }
                resolved => resolved,
            },
            repr => Some(repr),
        }
    }

    /// 로드 상태 조회
    pub fn status(&self) -> CatalogStatus {
        let baseline = self.baseline.read();
        let workspace = self.workspace.read();
        CatalogStatus {
            baseline_loaded: baseline.is_some(),
            baseline_len: baseline.as_ref().map_or(0, HashMap::len),
            workspace_loaded: workspace.is_some(),
            workspace_len: workspace.as_ref().map_or(0, HashMap::len),
        }
    }

    fn lookup(&self, name: &str) -> Option<EmojiRepr> {
        if let Some(repr) = self.baseline.read().as_ref().and_then(|m| m.get(name)) {
            return Some(repr.clone());
        }
        self.workspace
            .read()
            .as_ref()
            .and_then(|m| m.get(name))
            .cloned()
    }
}

/// 코드포인트 시퀀스(`1F468-200D-1F469`)를 HTML 숫자 문자 참조로 변환
///
/// 구분자 없이 `&#x<part>`를 이어 붙인다. 대소문자는 그대로 유지한다.
pub fn char_ref(unified: &str) -> String {
    unified
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| format!("&#x{part}"))
        .collect()
}

fn into_catalog_error(source_name: &str, err: CoreError) -> CoreError {
    match err {
        CoreError::CatalogLoad { .. } => err,
        other => CoreError::catalog_load(source_name, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticDataset(Vec<EmojiDataEntry>);

    #[async_trait]
    impl EmojiDatasetSource for StaticDataset {
        async fn fetch_entries(&self) -> Result<Vec<EmojiDataEntry>, CoreError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDataset;

    #[async_trait]
    impl EmojiDatasetSource for FailingDataset {
        async fn fetch_entries(&self) -> Result<Vec<EmojiDataEntry>, CoreError> {
            Err(CoreError::Network("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct CountingWorkspace {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl WorkspaceEmojiSource for CountingWorkspace {
        async fn list_custom_emoji(&self) -> Result<HashMap<String, String>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CoreError::catalog_load("workspace", "emoji 필드 없음"));
            }
            Ok([
                ("party".to_string(), "https://e.slack/party.png".to_string()),
                ("smile".to_string(), "https://e.slack/smile.png".to_string()),
                ("yay".to_string(), "alias:party".to_string()),
                ("grin".to_string(), "alias:smile".to_string()),
                ("loop".to_string(), "alias:yay".to_string()),
                ("ghost".to_string(), "alias:missing".to_string()),
            ]
            .into_iter()
            .collect())
        }
    }

    fn entry(short_name: &str, short_names: &[&str], unified: &str) -> EmojiDataEntry {
        EmojiDataEntry {
            short_name: short_name.to_string(),
            short_names: short_names.iter().map(|s| s.to_string()).collect(),
            unified: unified.to_string(),
        }
    }

    #[test]
    fn char_ref_single_and_multi() {
        assert_eq!(char_ref("1F604"), "&#x1F604");
        assert_eq!(
            char_ref("1F468-200D-1F469"),
            "&#x1F468&#x200D&#x1F469"
        );
    }

    #[test]
    fn build_baseline_primary_name_wins() {
        let entries = vec![
            entry("+1", &["+1", "thumbsup"], "1F44D"),
            entry("thumbsup", &["thumbsup"], "1F44E"),
        ];
        let map = EmojiCatalog::build_baseline(&entries);

        assert_eq!(map.get("+1"), Some(&EmojiRepr::CharRef("&#x1F44D".into())));
        assert_eq!(
            map.get("thumbsup"),
            Some(&EmojiRepr::CharRef("&#x1F44E".into()))
        );
    }

    #[tokio::test]
    async fn load_baseline_success() {
        let catalog = EmojiCatalog::new();
        let source = StaticDataset(vec![entry("smile", &["smile"], "1F604")]);

        let count = catalog.load_baseline(&source).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            catalog.resolve("smile"),
            Some(EmojiRepr::CharRef("&#x1F604".into()))
        );
        assert!(catalog.status().baseline_loaded);
    }

    #[tokio::test]
    async fn load_baseline_failure_leaves_catalog_usable() {
        let catalog = EmojiCatalog::new();

        let err = catalog.load_baseline(&FailingDataset).await.unwrap_err();
        assert_matches!(err, CoreError::CatalogLoad { ref source_name, .. } if source_name == "baseline");

        assert_eq!(catalog.resolve("smile"), None);
        assert!(!catalog.status().baseline_loaded);
    }

    #[tokio::test]
    async fn workspace_loaded_once() {
        let catalog = EmojiCatalog::new();
        let source = CountingWorkspace::default();

        assert!(catalog.ensure_workspace_loaded(&source).await.unwrap());
        assert!(!catalog.ensure_workspace_loaded(&source).await.unwrap());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(catalog.status().workspace_len, 6);
    }

    #[tokio::test]
    async fn workspace_failure_retries_next_time() {
        let catalog = EmojiCatalog::new();
        let source = CountingWorkspace {
            fail: true,
            ..Default::default()
        };

        assert!(catalog.ensure_workspace_loaded(&source).await.is_err());
        assert!(catalog.ensure_workspace_loaded(&source).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(!catalog.status().workspace_loaded);
    }

    #[tokio::test]
    async fn baseline_takes_priority_over_workspace() {
        let catalog = EmojiCatalog::with_sets(
            EmojiCatalog::build_baseline(&[entry("smile", &[], "1F604")]),
            None,
        );
        catalog
            .ensure_workspace_loaded(&CountingWorkspace::default())
            .await
            .unwrap();

        assert_eq!(
            catalog.resolve("smile"),
            Some(EmojiRepr::CharRef("&#x1F604".into()))
        );
        assert_eq!(
            catalog.resolve("party"),
            Some(EmojiRepr::ImageUrl("https://e.slack/party.png".into()))
        );
    }

    #[tokio::test]
    async fn workspace_alias_resolves_one_hop() {
        let catalog = EmojiCatalog::with_sets(
            EmojiCatalog::build_baseline(&[entry("smile", &[], "1F604")]),
            None,
        );
        catalog
            .ensure_workspace_loaded(&CountingWorkspace::default())
            .await
            .unwrap();

        assert_eq!(
            catalog.resolve("yay"),
            Some(EmojiRepr::ImageUrl("https://e.slack/party.png".into()))
        );
        // 별칭 대상도 기본 세트 우선
        assert_eq!(
            catalog.resolve("grin"),
            Some(EmojiRepr::CharRef("&#x1F604".into()))
        );
        assert_eq!(catalog.resolve("loop"), None);
        assert_eq!(catalog.resolve("ghost"), None);
    }
}
