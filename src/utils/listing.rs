//! 一覧画面の絞り込み・並び替え・グループ化
//!
//! 画面コンポーネントからは状態を持たない関数として呼ぶ。

use std::cmp::Ordering;
use std::collections::HashMap;

use jiff::civil::Date;

use crate::models::{Magazine, Prize, Service};
use crate::utils::text::{clean, month_key, normalize_date, parse_date};

pub const UNKNOWN_DATE: &str = "発売日不明";

// ============================================
// 表示状態
// ============================================

/// 読み込み中 > エラー > 0件 > 一覧 の優先順で1つに決まる
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Error(String),
    Empty,
    Populated,
}

pub fn list_state(loading: bool, error: &str, len: usize) -> ListState {
    if loading {
        ListState::Loading
    } else if !error.is_empty() {
        ListState::Error(error.to_string())
    } else if len == 0 {
        ListState::Empty
    } else {
        ListState::Populated
    }
}

/// 日付が読めないものは後ろへ
fn cmp_dates(a: Option<Date>, b: Option<Date>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn index_by_id(mags: &[Magazine]) -> HashMap<String, &Magazine> {
    mags.iter().map(|m| (clean(&m.magazine_id), m)).collect()
}

// ============================================
// 発売日一覧
// ============================================

/// 月の候補（新しい月が先）
pub fn month_options(mags: &[Magazine]) -> Vec<String> {
    let mut months: Vec<String> = mags
        .iter()
        .map(|m| normalize_date(&m.release_date))
        .filter(|ymd| !ymd.is_empty())
        .map(|ymd| month_key(&ymd))
        .collect();
    months.sort_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

/// 既定の表示月: 最新月、データが無ければ当月
pub fn default_month(options: &[String], current_month: &str) -> String {
    options.first().cloned().unwrap_or_else(|| current_month.to_string())
}

/// 月の候補が変わったときの表示月
///
/// ユーザーが選んだ月でも、候補から消えていれば既定の月に戻す。
pub fn reconcile_month(selected: &str, user_selected: bool, options: &[String], current_month: &str) -> String {
    let still_listed = options.iter().any(|m| m == selected);
    if user_selected && (still_listed || options.is_empty()) {
        selected.to_string()
    } else {
        default_month(options, current_month)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseFilter {
    pub month: String,
    pub keyword: String,
    pub all_months: bool,
}

/// 月・キーワードで絞り込み、発売日昇順（同日はタイトル順）
pub fn filter_releases(mags: &[Magazine], filter: &ReleaseFilter) -> Vec<Magazine> {
    let keyword = clean(&filter.keyword).to_lowercase();
    let mut list: Vec<Magazine> = mags
        .iter()
        .filter(|m| filter.all_months || month_key(&normalize_date(&m.release_date)) == filter.month)
        .filter(|m| {
            keyword.is_empty()
                || format!("{} {}", clean(&m.title), clean(&m.release_date))
                    .to_lowercase()
                    .contains(&keyword)
        })
        .cloned()
        .collect();

    list.sort_by(|a, b| {
        cmp_dates(parse_date(&a.release_date), parse_date(&b.release_date))
            .then_with(|| clean(&a.title).cmp(&clean(&b.title)))
    });
    list
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date_key: String,
    pub items: Vec<Magazine>,
}

/// 同じ発売日ごとにまとめる（日付昇順、不明は最後）
pub fn group_by_date(mags: &[Magazine]) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();
    for m in mags {
        let ymd = normalize_date(&m.release_date);
        let date_key = if ymd.is_empty() { UNKNOWN_DATE.to_string() } else { ymd };
        match groups.iter_mut().find(|g| g.date_key == date_key) {
            Some(group) => group.items.push(m.clone()),
            None => groups.push(DateGroup { date_key, items: vec![m.clone()] }),
        }
    }
    groups.sort_by(|a, b| cmp_dates(parse_date(&a.date_key), parse_date(&b.date_key)));
    groups
}

// ============================================
// 懸賞一覧
// ============================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// 締切が近い順
    #[default]
    Deadline,
    /// 掲載誌の発売日順
    Release,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Deadline => "deadline",
            SortMode::Release => "release",
        }
    }

    pub fn from_value(s: &str) -> Self {
        match s {
            "release" => SortMode::Release,
            _ => SortMode::Deadline,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrizeFilter {
    pub show_expired: bool,
    pub sort_mode: SortMode,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrizeRow {
    /// 応募済み管理用キー
    pub key: String,
    pub prize: Prize,
    pub magazine: Option<Magazine>,
}

impl PrizeRow {
    pub fn magazine_title(&self) -> String {
        let title = self.magazine.as_ref().map(|m| clean(&m.title)).unwrap_or_default();
        if !title.is_empty() {
            title
        } else if !clean(&self.prize.magazine_id).is_empty() {
            clean(&self.prize.magazine_id)
        } else {
            "（雑誌）".to_string()
        }
    }
}

/// 締切切れ判定: 締切日が今日より前（読めない締切は期限切れにしない）
pub fn is_expired(deadline: &str, today: Date) -> bool {
    parse_date(deadline).is_some_and(|d| d < today)
}

pub fn prize_rows(prizes: &[Prize], mags: &[Magazine], filter: &PrizeFilter, today: Date) -> Vec<PrizeRow> {
    let by_id = index_by_id(mags);
    let keyword = clean(&filter.keyword).to_lowercase();

    let mut rows: Vec<PrizeRow> = prizes
        .iter()
        .enumerate()
        .map(|(idx, p)| PrizeRow {
            key: p.applied_key(idx),
            prize: p.clone(),
            magazine: by_id.get(&clean(&p.magazine_id)).map(|m| (*m).clone()),
        })
        .filter(|row| filter.show_expired || !is_expired(&row.prize.deadline, today))
        .filter(|row| {
            if keyword.is_empty() {
                return true;
            }
            let title = row.magazine.as_ref().map(|m| clean(&m.title)).unwrap_or_default();
            format!(
                "{} {} {} {}",
                title,
                clean(&row.prize.name),
                clean(&row.prize.content),
                clean(&row.prize.how_to_apply)
            )
            .to_lowercase()
            .contains(&keyword)
        })
        .collect();

    match filter.sort_mode {
        SortMode::Deadline => {
            rows.sort_by(|a, b| cmp_dates(parse_date(&a.prize.deadline), parse_date(&b.prize.deadline)))
        }
        SortMode::Release => rows.sort_by(|a, b| {
            let da = a.magazine.as_ref().and_then(|m| parse_date(&m.release_date));
            let db = b.magazine.as_ref().and_then(|m| parse_date(&m.release_date));
            cmp_dates(da, db)
        }),
    }
    rows
}

// ============================================
// 全プレ一覧
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub service: Service,
    pub magazine_title: String,
}

pub fn service_rows(services: &[Service], mags: &[Magazine]) -> Vec<ServiceRow> {
    let by_id = index_by_id(mags);
    services
        .iter()
        .map(|s| ServiceRow {
            service: s.clone(),
            magazine_title: by_id.get(&clean(&s.magazine_id)).map(|m| clean(&m.title)).unwrap_or_default(),
        })
        .collect()
}

// ============================================
// 雑誌詳細
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct MagazineDetail {
    pub magazine: Option<Magazine>,
    /// (応募済みキー, 懸賞)。キーは取得リスト全体での並び順から作る
    pub prizes: Vec<(String, Prize)>,
    pub services: Vec<Service>,
}

pub fn magazine_detail(id: &str, mags: &[Magazine], prizes: &[Prize], services: &[Service]) -> MagazineDetail {
    let id = clean(id);
    MagazineDetail {
        magazine: mags.iter().find(|m| clean(&m.magazine_id) == id).cloned(),
        prizes: prizes
            .iter()
            .enumerate()
            .filter(|(_, p)| clean(&p.magazine_id) == id)
            .map(|(idx, p)| (p.applied_key(idx), p.clone()))
            .collect(),
        services: services.iter().filter(|s| clean(&s.magazine_id) == id).cloned().collect(),
    }
}

/// 3コレクションの状態をまとめる（どれか読み込み中なら読み込み中、エラーは最初のもの）
pub fn combine_status<'a>(loading: &[bool], errors: &[&'a str]) -> (bool, &'a str) {
    let loading = loading.iter().any(|l| *l);
    let error = errors.iter().copied().find(|e| !e.is_empty()).unwrap_or("");
    (loading, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn mag(id: &str, release: &str, title: &str) -> Magazine {
        Magazine {
            magazine_id: id.into(),
            release_date: release.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    fn prize(id: &str, mag_id: &str, deadline: &str) -> Prize {
        Prize {
            prize_id: id.into(),
            magazine_id: mag_id.into(),
            deadline: deadline.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_state_precedence() {
        assert_eq!(list_state(true, "err", 3), ListState::Loading);
        assert_eq!(list_state(false, "err", 3), ListState::Error("err".into()));
        assert_eq!(list_state(false, "", 0), ListState::Empty);
        assert_eq!(list_state(false, "", 2), ListState::Populated);
    }

    #[test]
    fn test_month_options() {
        let mags = vec![
            mag("a", "2026/01/05", "A"),
            mag("b", "2025-12-28", "B"),
            mag("c", "2026-01-20", "C"),
            mag("d", "", "D"),
        ];
        let options = month_options(&mags);
        assert_eq!(options, vec!["2026-01", "2025-12"]);
        assert_eq!(default_month(&options, "2030-05"), "2026-01");
        assert_eq!(default_month(&[], "2030-05"), "2030-05");
    }

    #[test]
    fn test_reconcile_month() {
        let options = vec!["2026-02".to_string(), "2026-01".to_string()];
        // 未選択なら最新月
        assert_eq!(reconcile_month("", false, &options, "2030-05"), "2026-02");
        assert_eq!(reconcile_month("2026-01", false, &options, "2030-05"), "2026-02");
        // 選んだ月が残っていればそのまま
        assert_eq!(reconcile_month("2026-01", true, &options, "2030-05"), "2026-01");
        // 消えたら最新月に戻る
        assert_eq!(reconcile_month("2025-11", true, &options, "2030-05"), "2026-02");
        // 候補が空なら選択を保つ
        assert_eq!(reconcile_month("2025-11", true, &[], "2030-05"), "2025-11");
    }

    #[test]
    fn test_group_by_date() {
        let mags = vec![
            mag("c", "2026-01-20", "C"),
            mag("a", "2026-01-05", "A"),
            mag("b", "2026-01-05", "B"),
        ];
        let groups = group_by_date(&mags);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date_key, "2026-01-05");
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].date_key, "2026-01-20");
    }

    #[test]
    fn test_group_unknown_date_last() {
        let mags = vec![mag("x", "", "X"), mag("a", "2026/02/01", "A")];
        let groups = group_by_date(&mags);
        assert_eq!(groups[0].date_key, "2026-02-01");
        assert_eq!(groups[1].date_key, UNKNOWN_DATE);
    }

    #[test]
    fn test_filter_releases_by_month_and_keyword() {
        let mags = vec![
            mag("b", "2026-01-20", "週刊ビー"),
            mag("a", "2026/01/05", "月刊エー"),
            mag("z", "2026-01-05", "Alpha"),
            mag("c", "2026-02-01", "月刊シー"),
        ];
        let filter = ReleaseFilter { month: "2026-01".into(), ..Default::default() };
        let ids: Vec<_> = filter_releases(&mags, &filter).into_iter().map(|m| m.magazine_id).collect();
        assert_eq!(ids, vec!["z", "a", "b"]);

        let filter = ReleaseFilter { month: "2026-01".into(), keyword: " 月刊 ".into(), all_months: false };
        let ids: Vec<_> = filter_releases(&mags, &filter).into_iter().map(|m| m.magazine_id).collect();
        assert_eq!(ids, vec!["a"]);

        let filter = ReleaseFilter { month: "2026-01".into(), keyword: "月刊".into(), all_months: true };
        let ids: Vec<_> = filter_releases(&mags, &filter).into_iter().map(|m| m.magazine_id).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let filter = ReleaseFilter { month: "2026-01".into(), keyword: "ALPHA".into(), all_months: false };
        assert_eq!(filter_releases(&mags, &filter).len(), 1);
    }

    #[test]
    fn test_prize_rows_hide_expired() {
        let prizes = vec![
            prize("old", "m1", "2026-01-01"),
            prize("today", "m1", "2026-01-10"),
            prize("later", "m1", "2026/02/01"),
            prize("unknown", "m1", "なくなり次第終了"),
        ];
        let today = date(2026, 1, 10);
        let rows = prize_rows(&prizes, &[], &PrizeFilter::default(), today);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["today", "later", "unknown"]);

        let filter = PrizeFilter { show_expired: true, ..Default::default() };
        let rows = prize_rows(&prizes, &[], &filter, today);
        assert_eq!(rows[0].key, "old");
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_prize_rows_keyword_and_release_sort() {
        let mags = vec![mag("m1", "2026-03-01", "週刊ワン"), mag("m2", "2026-01-15", "月刊ツー")];
        let mut p1 = prize("p1", "m1", "2026-04-01");
        p1.content = "Nintendo Switch、図書カード".into();
        let mut p2 = prize("p2", "m2", "2026-05-01");
        p2.name = "読者プレゼント".into();
        let prizes = vec![p1, p2];
        let today = date(2026, 1, 1);

        let filter = PrizeFilter { keyword: "switch".into(), ..Default::default() };
        let rows = prize_rows(&prizes, &mags, &filter, today);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].magazine_title(), "週刊ワン");

        let filter = PrizeFilter { keyword: "月刊".into(), ..Default::default() };
        assert_eq!(prize_rows(&prizes, &mags, &filter, today)[0].key, "p2");

        let filter = PrizeFilter { sort_mode: SortMode::Release, ..Default::default() };
        let keys: Vec<_> = prize_rows(&prizes, &mags, &filter, today).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["p2", "p1"]);
    }

    #[test]
    fn test_prize_row_title_fallback() {
        let prizes = vec![prize("", "m404", ""), prize("", "", "")];
        let rows = prize_rows(&prizes, &[], &PrizeFilter::default(), date(2026, 1, 1));
        assert_eq!(rows[0].magazine_title(), "m404");
        assert_eq!(rows[0].key, "m404_0");
        assert_eq!(rows[1].magazine_title(), "（雑誌）");
        assert_eq!(rows[1].key, "_1");
    }

    #[test]
    fn test_service_rows() {
        let mags = vec![mag("m1", "2026-01-05", "週刊ワン")];
        let services = vec![
            Service { service_id: "s1".into(), magazine_id: " m1".into(), ..Default::default() },
            Service { service_id: "s2".into(), magazine_id: "m9".into(), ..Default::default() },
        ];
        let rows = service_rows(&services, &mags);
        assert_eq!(rows[0].magazine_title, "週刊ワン");
        assert_eq!(rows[1].magazine_title, "");
    }

    #[test]
    fn test_magazine_detail() {
        let mags = vec![mag("m1", "2026-01-05", "週刊ワン"), mag("m2", "2026-01-06", "月刊ツー")];
        let prizes = vec![prize("p1", "m1", ""), prize("p2", "m2", ""), prize("p3", "m1", "")];
        let services = vec![Service { service_id: "s1".into(), magazine_id: "m2".into(), ..Default::default() }];

        let detail = magazine_detail(" m1 ", &mags, &prizes, &services);
        assert_eq!(detail.magazine.unwrap().title, "週刊ワン");
        let keys: Vec<&str> = detail.prizes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["p1", "p3"]);
        assert!(detail.services.is_empty());

        let detail = magazine_detail("missing", &mags, &prizes, &services);
        assert!(detail.magazine.is_none());
    }

    #[test]
    fn test_combine_status() {
        assert_eq!(combine_status(&[false, true, false], &["", "", ""]), (true, ""));
        assert_eq!(combine_status(&[false, false, false], &["", "b", "c"]), (false, "b"));
    }

    #[test]
    fn test_sort_mode_roundtrip() {
        assert_eq!(SortMode::from_value(SortMode::Release.as_str()), SortMode::Release);
        assert_eq!(SortMode::from_value("unknown"), SortMode::Deadline);
    }
}
