use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;

use tempfile::TempDir;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "orange-crate-stapler";

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    server_process: Option<Child>,
}

static BUILD_RELEASE: LazyLock<()> = LazyLock::new(|| {
    let build_status = Command::new("cargo")
        .args(["build", "--release"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("build release binary");
    assert!(build_status.success(), "Failed to build release binary");
});

fn binary() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("target/release/certdesk")
}

impl TestServer {
    pub async fn start() -> Self {
        LazyLock::force(&BUILD_RELEASE);

        let temp_dir = TempDir::new().expect("create temp dir");
        let data_dir = temp_dir.path();

        let init_output = Command::new(binary())
            .args(["admin", "init", "--data-dir"])
            .arg(data_dir)
            .args([
                "--non-interactive",
                "--username",
                ADMIN_USERNAME,
                "--password",
                ADMIN_PASSWORD,
            ])
            .output()
            .expect("run init");
        assert!(
            init_output.status.success(),
            "Failed to initialize database"
        );

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(binary())
            .args(["serve", "--data-dir"])
            .arg(data_dir)
            .args(["--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        Self::wait_for_ready(&base_url).await;

        Self {
            temp_dir,
            base_url,
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(base_url: &str) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Seeds a specification through the CLI and returns its id.
    pub fn add_spec(&self, name: &str, start: i64) -> String {
        let status = Command::new(binary())
            .args(["admin", "spec", "add", "--data-dir"])
            .arg(self.data_dir())
            .args(["--name", name, "--start"])
            .arg(start.to_string())
            .status()
            .expect("run spec add");
        assert!(status.success(), "Failed to add specification");

        let info = self.info_json();
        info["specifications"]
            .as_array()
            .expect("specifications not an array")
            .iter()
            .find(|s| s["name"] == name)
            .expect("specification not found")["id"]
            .as_str()
            .expect("id not a string")
            .to_string()
    }

    pub fn info_json(&self) -> serde_json::Value {
        let output = Command::new(binary())
            .args(["admin", "info", "--data-dir"])
            .arg(self.data_dir())
            .arg("--json")
            .output()
            .expect("run info");
        assert!(output.status.success(), "Failed to read registry info");

        serde_json::from_slice(&output.stdout).expect("parse info JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
