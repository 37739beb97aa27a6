//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub use wrangle_lib::util::hash::hash_bytes as sha256_hex;

pub const BOTTLE_BODY: &[u8] = b"zlib bottle contents";

pub const ZLIB_FORMULA: &str = r#"class Zlib < Formula
  desc "General-purpose lossless data-compression library"
  url "https://zlib.net/zlib-1.2.11.tar.gz"
  sha256 "c3e5e9fdd5004dcb542feda5ee4f0ff0744628baf8ed2dd5d66f8ca1197cb1a1"

  bottle do
    sha256 "1111111111111111111111111111111111111111111111111111111111111111" => :sierra
    sha256 "2222222222222222222222222222222222222222222222222222222222222222" => :x86_64_linux
  end
end
"#;

pub const CURL_FORMULA: &str = r#"class Curl < Formula
  desc "Get a file from an HTTP, HTTPS or FTP server"
  url "https://curl.haxx.se/download/curl-7.61.0.tar.bz2"
  revision 1

  depends_on "pkg-config" => :build
  depends_on "zlib"
end
"#;

pub const NOVERSION_FORMULA: &str = r#"class Mystery < Formula
  url "https://example.com/download/"
end
"#;

/// Isolated provision tree and destination directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Formulas for zlib, curl and an unversioned formula, plus a linux
  /// platform manifest asking for all three.
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("provision/formula/zlib.rb", ZLIB_FORMULA);
    env.write_file("provision/formula/curl.rb", CURL_FORMULA);
    env.write_file("provision/formula/mystery.rb", NOVERSION_FORMULA);
    env.write_file(
      "provision/linux-formulas.csv",
      "# type,name\ntool,zlib\ndep,curl\ntool,mystery\nbuild,ignored-by-type\n",
    );
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write the hosted bottle manifest, pointing the `bottles` host at `url`.
  pub fn write_manifest(&self, url: &str, rows: &[(&str, &str)]) {
    let mut content = format!("HOST,bottles,{}\n", url);
    for (filename, hash) in rows {
      content.push_str(&format!("bottles,{},{}\n", filename, hash));
    }
    self.write_file("provision/hosted-bottle-list.csv", &content);
  }

  pub fn provision_dir(&self) -> PathBuf {
    self.temp.path().join("provision")
  }

  pub fn dest_dir(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  /// Command for the wrangle binary with isolated paths and a fixed platform.
  pub fn wrangle_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("wrangle");
    cmd
      .env("WRANGLE_PROVISION_DIR", self.provision_dir())
      .env("WRANGLE_DEST_DIR", self.dest_dir())
      .env("WRANGLE_PLATFORM", "linux")
      .env_remove("WRANGLE_PLATFORM_HELPER")
      .env_remove("WRANGLE_JOBS")
      .env_remove("RUST_LOG");
    cmd
  }
}
