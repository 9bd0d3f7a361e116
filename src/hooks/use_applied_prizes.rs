use leptos::*;

use crate::store::AppliedPrizes;

use super::DataContext;

#[derive(Clone, Copy)]
pub struct AppliedPrizesHandle {
    inner: RwSignal<AppliedPrizes>,
}

impl AppliedPrizesHandle {
    pub fn ready(&self) -> bool {
        self.inner.with(|a| a.ready())
    }

    pub fn has(&self, id: &str) -> bool {
        self.inner.with(|a| a.has(id))
    }

    pub fn toggle(&self, id: &str) {
        self.inner.update(|a| a.toggle(id));
    }

    pub fn clear_all(&self) {
        self.inner.update(|a| a.clear_all());
    }

    pub fn count(&self) -> usize {
        self.inner.with(|a| a.count())
    }
}

/// 応募済みフラグ（localStorage、端末ローカル）
pub fn use_applied_prizes() -> AppliedPrizesHandle {
    let ctx = expect_context::<DataContext>();
    AppliedPrizesHandle {
        inner: create_rw_signal(AppliedPrizes::load(ctx.preferences.clone())),
    }
}
