use leptos::*;

use crate::models::{Collection, Magazine, Prize, Service};
use crate::store::{CollectionResource, CollectionState};

use super::DataContext;

/// `{items, loading, error}` をシグナルとして公開するハンドル
pub struct CollectionHandle<T: Collection> {
    pub state: ReadSignal<CollectionState<T>>,
    resource: StoredValue<CollectionResource<T>>,
}

impl<T: Collection> Clone for CollectionHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Collection> Copy for CollectionHandle<T> {}

impl<T: Collection> CollectionHandle<T> {
    pub fn items(&self) -> Vec<T> {
        self.state.with(|s| s.items.clone())
    }

    pub fn loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn error(&self) -> String {
        self.state.with(|s| s.error.clone())
    }

    /// 手動更新（鮮度チェックを無視して再取得）
    pub fn refresh(&self) {
        if let Some(fut) = self.resource.with_value(|r| r.refresh()) {
            spawn_local(fut);
        }
    }
}

/// コレクション取得フック
///
/// コンポーネントのマウントごとに独立したリソースを作り、破棄時にフェッチを止める。
pub fn use_collection<T: Collection>(force_refresh: bool) -> CollectionHandle<T> {
    let ctx = expect_context::<DataContext>();
    let resource = CollectionResource::<T>::new(&ctx.config, ctx.store.clone(), ctx.fetcher.clone());

    let state = create_rw_signal(resource.state());
    resource.subscribe(move |s| state.set(s.clone()));

    if let Some(fut) = resource.start(force_refresh) {
        spawn_local(fut);
    }

    {
        let resource = resource.clone();
        on_cleanup(move || resource.dispose());
    }

    CollectionHandle {
        state: state.read_only(),
        resource: store_value(resource),
    }
}

pub fn use_magazines() -> CollectionHandle<Magazine> {
    use_collection(false)
}

pub fn use_prizes() -> CollectionHandle<Prize> {
    use_collection(false)
}

pub fn use_services() -> CollectionHandle<Service> {
    use_collection(false)
}
