//! Package build description, read from RON.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::error::ToolError;

pub const ANDROID_ABIS: &[&str] = &["armeabi-v7a", "arm64-v8a", "x86", "x86_64"];
pub const OHOS_ABIS: &[&str] = &["armeabi-v7a", "arm64-v8a"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JavaBuild {
    Gradle,
    Ant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidSdk {
    pub sdk: PathBuf,
    pub ndk: PathBuf,
    #[serde(default = "default_java_build")]
    pub java_build: JavaBuild,
    /// Version directory under `build-tools`; the newest one when absent.
    #[serde(default)]
    pub build_tools: Option<String>,
}

fn default_java_build() -> JavaBuild {
    JavaBuild::Gradle
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapSigning {
    pub key_alias: String,
    pub app_cert: PathBuf,
    pub profile: PathBuf,
    pub keystore: PathBuf,
    pub key_password: String,
    pub keystore_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhosSdk {
    /// Public SDK with the native toolchain.
    pub sdk: PathBuf,
    /// Command line tools holding `hvigorw` and `hap-sign-tool.jar`.
    pub clt: PathBuf,
    pub signing: HapSigning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Android(AndroidSdk),
    Ohos(OhosSdk),
}

impl Platform {
    pub fn known_abis(&self) -> &'static [&'static str] {
        match self {
            Platform::Android(_) => ANDROID_ABIS,
            Platform::Ohos(_) => OHOS_ABIS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub src_root: PathBuf,
    pub build_root: PathBuf,
    pub abis: Vec<String>,
    pub native_api: u32,
    #[serde(default = "default_build_type")]
    pub build_type: String,
    #[serde(default = "default_generator")]
    pub generator: String,
    pub platform: Platform,
}

fn default_build_type() -> String {
    String::from("Release")
}

fn default_generator() -> String {
    String::from("Ninja")
}

impl BuildConfig {
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, ToolError> {
        let config: BuildConfig =
            ron::from_str(text).map_err(|e| ToolError::ConfigError(path.to_path_buf(), e))?;
        config.check_abis(&config.abis)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ToolError> {
        let text = fs::read_to_string(path).map_err(|e| ToolError::IOError(path.display().to_string(), e))?;
        BuildConfig::from_ron(&text, path)
    }

    pub fn check_abis(&self, abis: &[String]) -> Result<(), ToolError> {
        let known = self.platform.known_abis();
        match abis.iter().find(|abi| !known.contains(&abi.as_str())) {
            Some(abi) => Err(ToolError::UnknownAbi(abi.clone())),
            None => Ok(()),
        }
    }

    /// `<build-root>/<abi>-<buildtype>-<api>`
    pub fn native_build_dir(&self, abi: &str) -> PathBuf {
        self.build_root
            .join(format!("{}-{}-{}", abi, self.build_type, self.native_api))
    }
}

/// What gets packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Deqp,
    OpenGlCts,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deqp" => Ok(Target::Deqp),
            "openglcts" => Ok(Target::OpenGlCts),
            _ => Err(format!("unknown target '{}', expected deqp or openglcts", s)),
        }
    }
}

impl Target {
    /// Directory under the build root and under `android/`.
    pub fn app_dir(self) -> &'static str {
        match self {
            Target::Deqp => "package",
            Target::OpenGlCts => "openglcts",
        }
    }

    pub fn app_name(self) -> &'static str {
        match self {
            Target::Deqp => "dEQP",
            Target::OpenGlCts => "Khronos-CTS",
        }
    }

    pub fn package_name(self) -> &'static str {
        match self {
            Target::Deqp => "com.drawelements.deqp",
            Target::OpenGlCts => "org.khronos.gl_cts",
        }
    }

    pub fn native_target(self) -> &'static str {
        match self {
            Target::Deqp => "deqp",
            Target::OpenGlCts => "glcts",
        }
    }
}
