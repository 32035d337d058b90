//! Native library builds with CMake, one build directory per ABI.

use std::path::PathBuf;

use crate::config::{BuildConfig, Platform, Target};
use crate::error::ToolError;
use crate::process::Invocation;
use crate::step::BuildStep;

pub const NATIVE_LIBRARY: &str = "libdeqp.so";

/// Configures and builds the native library for one ABI. CMake tracks its
/// own dependencies, so the step always runs.
#[derive(Debug, Clone)]
pub struct NativeBuild {
    pub config: BuildConfig,
    pub abi: String,
    pub target: Target,
    pub cmake: PathBuf,
    pub ccache: Option<PathBuf>,
}

impl NativeBuild {
    pub fn new(config: &BuildConfig, abi: &str, target: Target) -> Result<Self, ToolError> {
        let cmake = which::which("cmake").map_err(|error| ToolError::NotFound {
            tool: String::from("cmake"),
            error,
        })?;
        let ccache = match which::which("ccache") {
            Ok(path) => Some(path),
            Err(_) => None,
        };
        Ok(NativeBuild {
            config: config.clone(),
            abi: abi.to_string(),
            target,
            cmake,
            ccache,
        })
    }

    pub fn build_dir(&self) -> PathBuf {
        self.config.native_build_dir(&self.abi)
    }

    pub fn library(&self) -> PathBuf {
        self.build_dir().join(NATIVE_LIBRARY)
    }

    fn platform_args(&self) -> Vec<String> {
        match &self.config.platform {
            Platform::Android(android) => vec![
                String::from("-DDEQP_TARGET=android"),
                format!(
                    "-DCMAKE_TOOLCHAIN_FILE={}",
                    android.ndk.join("build/cmake/android.toolchain.cmake").display()
                ),
                format!("-DANDROID_ABI={}", self.abi),
                format!("-DANDROID_PLATFORM=android-{}", self.config.native_api),
                format!("-DDE_ANDROID_API={}", self.config.native_api),
            ],
            Platform::Ohos(ohos) => vec![
                String::from("-DDEQP_TARGET=ohos"),
                format!(
                    "-DCMAKE_TOOLCHAIN_FILE={}",
                    ohos.sdk
                        .join("sdk/default/openharmony/native/build/cmake/ohos.toolchain.cmake")
                        .display()
                ),
                format!("-DOHOS_ABI={}", self.abi),
            ],
        }
    }
}

impl BuildStep for NativeBuild {
    fn name(&self) -> String {
        format!("Building native library for {}", self.abi)
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        let build_dir = self.build_dir();
        let mut configure = Invocation::new(&self.cmake)
            .arg("-S")
            .arg(&self.config.src_root)
            .arg("-B")
            .arg(&build_dir)
            .arg("-G")
            .arg(&self.config.generator)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.config.build_type))
            .args(self.platform_args());
        if let Some(ccache) = &self.ccache {
            configure = configure
                .arg(format!("-DCMAKE_C_COMPILER_LAUNCHER={}", ccache.display()))
                .arg(format!("-DCMAKE_CXX_COMPILER_LAUNCHER={}", ccache.display()));
        }
        let build = Invocation::new(&self.cmake)
            .arg("--build")
            .arg(&build_dir)
            .arg("--target")
            .arg(self.target.native_target());
        Ok(vec![configure, build])
    }
}
