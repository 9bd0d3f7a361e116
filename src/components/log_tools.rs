//! フッターのログ操作（不具合報告用）

use leptos::*;

use crate::utils::gas::{clear_gas_url, get_gas_url};
use crate::utils::log_trace::{clear_logs, copy_logs_to_clipboard_async, download_logs};

#[component]
pub fn LogTools() -> impl IntoView {
    let (copied, set_copied) = create_signal(false);

    let on_copy = move |_| {
        spawn_local(async move {
            if copy_logs_to_clipboard_async().await.is_ok() {
                set_copied.set(true);
                // 2秒後にリセット
                gloo::timers::future::TimeoutFuture::new(2000).await;
                set_copied.set(false);
            }
        });
    };

    // ?gas= で保存した接続先を解除して既定値に戻す
    let saved_gas = get_gas_url().is_some();
    let on_reset_gas = move |_| {
        clear_gas_url();
        tracing::info!("saved gas url cleared");
        let _ = window().location().reload();
    };

    view! {
        <footer class="log-tools">
            <button class="btn soft small" on:click=on_copy>
                {move || if copied.get() { "コピーしました!" } else { "ログをコピー" }}
            </button>
            <button class="btn soft small" on:click=move |_| download_logs()>"ログを保存"</button>
            <button class="btn soft small" on:click=move |_| clear_logs()>"ログを消去"</button>
            {saved_gas.then(|| view! {
                <button class="btn soft small" on:click=on_reset_gas>"接続先の上書きを解除"</button>
            })}
        </footer>
    }
}
