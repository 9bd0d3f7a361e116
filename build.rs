use std::env;

fn main() {
    // GAS_URL をバイナリに埋め込む（未設定なら実行時エラー表示に回す）
    match env::var("GAS_URL") {
        Ok(url) if !url.trim().is_empty() => {
            println!("cargo:warning=GAS_URL set to {}", url.trim());
            println!("cargo:rustc-env=MANGA_NAVI_GAS_URL={}", url.trim());
        }
        _ => {
            println!("cargo:warning=GAS_URL is not set; endpoint must be given with ?gas=");
        }
    }

    // 環境変数変更時に再ビルド
    println!("cargo:rerun-if-env-changed=GAS_URL");
}
