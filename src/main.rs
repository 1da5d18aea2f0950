//! DistScene 演示程序
//!
//! 加载配置和场景描述，构建场景并运行若干帧，输出渲染队列。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用 config.toml 和 scene.toml
//! cargo run
//!
//! # 指定资源目录和日志级别
//! cargo run -- --asset-dir demo/assets --log-level debug
//! ```
//!
//! # 初始化流程
//!
//! 1. 加载配置文件（config.toml）并应用命令行参数
//! 2. 验证配置并初始化日志系统
//! 3. 创建 Director，加载场景描述（scene.toml）
//! 4. 运行帧循环，输出渲染队列

use anyhow::Context;
use tracing::{debug, info};

use dist_scene::core::{log, Config, SceneConfig};
use dist_scene::director::Director;
use dist_scene::{app_error, app_info};

/// 演示运行的帧数
const DEMO_FRAMES: u32 = 3;

fn main() {
    if let Err(e) = run() {
        app_error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");
    config.apply_args(std::env::args());
    config.validate().context("invalid configuration")?;

    // 2. 初始化日志系统
    let log_file = config
        .logging
        .file_output
        .then(|| config.logging.log_file.clone());
    log::init_logger(config.logging.level, config.logging.file_output, log_file.as_deref())
        .context("failed to initialise logging")?;
    app_info!(version = env!("CARGO_PKG_VERSION"), "DistScene starting");

    info!(
        search_paths = ?config.assets.search_paths,
        allow_duplicates = config.scene.allow_duplicate_components,
        "Configuration loaded"
    );

    // 3. 构建场景
    let scene_config = SceneConfig::from_file_or_default("scene.toml");
    let mut director = Director::new(config);
    let scene = director
        .load_scene(&scene_config)
        .with_context(|| format!("failed to build scene '{}'", scene_config.name))?;
    director.run_scene(scene);

    // 4. 帧循环
    for _ in 0..DEMO_FRAMES {
        let stats = director.main_loop(1.0 / 60.0);
        debug!(?stats, "Frame");
    }

    let scene = director.scene();
    for item in scene.render_queue() {
        let name = scene.node(item.node).map(|n| n.name().to_string())?;
        let render = item.render_node;
        info!(
            node = %name,
            color = ?render.color(),
            texture = render.texture().map(|t| t.key()).unwrap_or("-"),
            rect = ?render.effective_rect(),
            x = item.world_matrix[(0, 3)],
            y = item.world_matrix[(1, 3)],
            "Render item"
        );
    }

    app_info!(
        frames = director.frame(),
        textures = director.texture_cache().len(),
        "DistScene finished"
    );
    Ok(())
}
