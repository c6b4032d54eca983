use chrono::Utc;

fn main() {
    // Build time shown in the startup banner / 启动日志中显示的构建时间
    let build_time = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-changed=build.rs");
}
