use coursepress_core::{config::Config, CoursePressError};
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, open: bool) -> anyhow::Result<()> {
    let config = match Config::load(root) {
        Ok(c) => c,
        Err(CoursePressError::NotInitialized) => {
            tracing::warn!(root = %root.display(), "no coursepress.yaml, serving with defaults");
            Config::new("coursepress")
        }
        Err(e) => return Err(e.into()),
    };
    let port = port.unwrap_or(config.server.port);
    let open_browser = open || config.server.open_browser;

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "CoursePress for '{}' → http://localhost:{actual_port}",
            config.site.name
        );

        tokio::select! {
            res = coursepress_server::serve_on(root_buf, listener, open_browser) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
