//! Packaging steps for Android APKs and Ohos HAPs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{AndroidSdk, BuildConfig, HapSigning, JavaBuild, OhosSdk, Platform, Target};
use crate::error::ToolError;
use crate::native::{NativeBuild, NATIVE_LIBRARY};
use crate::process::{execute, find_tool, Invocation};
use crate::step::BuildStep;

const KEYSTORE_PASSWORD: &str = "android";
const KEY_ALIAS: &str = "androiddebugkey";

fn io_error(path: &Path, e: std::io::Error) -> ToolError {
    ToolError::IOError(path.display().to_string(), e)
}

/// Build output locations for one package.
#[derive(Debug, Clone)]
pub struct Layout {
    pub build_root: PathBuf,
    pub src_root: PathBuf,
    pub target: Target,
}

impl Layout {
    pub fn new(config: &BuildConfig, target: Target) -> Self {
        Layout {
            build_root: config.build_root.clone(),
            src_root: config.src_root.clone(),
            target,
        }
    }

    pub fn app_dir(&self) -> PathBuf {
        self.build_root.join(self.target.app_dir())
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.app_dir().join("tmp")
    }

    pub fn java_project(&self) -> PathBuf {
        self.src_root.join("android").join(self.target.app_dir())
    }

    pub fn keystore(&self) -> PathBuf {
        self.build_root.join("debug.keystore")
    }

    pub fn unsigned_apk(&self, java_build: &JavaBuild) -> PathBuf {
        match java_build {
            JavaBuild::Gradle => self
                .app_dir()
                .join("gradle/outputs/apk/release")
                .join(format!("{}-release-unsigned.apk", self.target.app_name())),
            JavaBuild::Ant => self
                .app_dir()
                .join("bin")
                .join(format!("{}-release-unsigned.apk", self.target.app_name())),
        }
    }

    pub fn final_apk(&self) -> PathBuf {
        self.app_dir().join(format!("{}.apk", self.target.app_name()))
    }

    pub fn hap_project(&self) -> PathBuf {
        self.app_dir().join("happroject")
    }

    pub fn unsigned_hap(&self) -> PathBuf {
        self.hap_project()
            .join("entry/build/default/outputs/default/entry-default-unsigned.hap")
    }

    pub fn final_hap(&self) -> PathBuf {
        self.app_dir().join(format!("{}.hap", self.target.app_name()))
    }
}

fn build_tools_dir(sdk: &AndroidSdk) -> Result<PathBuf, ToolError> {
    let root = sdk.sdk.join("build-tools");
    if let Some(version) = &sdk.build_tools {
        return Ok(root.join(version));
    }
    let mut versions: Vec<PathBuf> = fs::read_dir(&root)
        .map_err(|e| io_error(&root, e))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    versions.sort();
    versions.pop().ok_or_else(|| {
        io_error(
            &root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no build-tools versions installed"),
        )
    })
}

#[derive(Debug, Clone)]
pub struct CreateKeystore {
    pub layout: Layout,
}

impl BuildStep for CreateKeystore {
    fn name(&self) -> String {
        String::from("Creating debug keystore")
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.layout.keystore()]
    }

    fn is_up_to_date(&self) -> Result<bool, ToolError> {
        Ok(self.layout.keystore().exists())
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        Ok(vec![Invocation::new("keytool")
            .arg("-genkeypair")
            .arg("-keystore")
            .arg(self.layout.keystore())
            .args(["-storepass", KEYSTORE_PASSWORD])
            .args(["-alias", KEY_ALIAS])
            .args(["-keypass", KEYSTORE_PASSWORD])
            .args(["-keyalg", "RSA", "-keysize", "2048", "-validity", "10000"])
            .args(["-dname", "CN=, OU=, O=, L=, S=, C="])])
    }
}

/// Compiles the Java side with gradle or ant.
#[derive(Debug, Clone)]
pub struct BuildJava {
    pub layout: Layout,
    pub java_build: JavaBuild,
}

impl BuildStep for BuildJava {
    fn name(&self) -> String {
        format!("Building {} Java package", self.layout.target.app_name())
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![self.layout.java_project().join("src")]
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.layout.unsigned_apk(&self.java_build)]
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        let project = self.layout.java_project();
        let cmd = match self.java_build {
            JavaBuild::Gradle => Invocation::new("gradle")
                .arg("--project-dir")
                .arg(&project)
                .arg(format!("-PbuildDir={}", self.layout.app_dir().join("gradle").display()))
                .arg("assembleRelease"),
            JavaBuild::Ant => Invocation::new("ant")
                .arg("-f")
                .arg(project.join("build.xml"))
                .arg(format!("-Dout.dir={}", self.layout.app_dir().join("bin").display()))
                .arg("release"),
        };
        Ok(vec![cmd])
    }
}

/// Adds the per-ABI native libraries to the unsigned APK.
#[derive(Debug, Clone)]
pub struct AddNativeLibs {
    pub layout: Layout,
    pub java_build: JavaBuild,
    pub aapt: PathBuf,
    pub libs: Vec<(String, PathBuf)>,
}

impl AddNativeLibs {
    pub fn output(&self) -> PathBuf {
        self.layout.tmp_dir().join("with-libs.apk")
    }

    fn staged(&self, abi: &str) -> String {
        format!("lib/{}/{}", abi, NATIVE_LIBRARY)
    }
}

impl BuildStep for AddNativeLibs {
    fn name(&self) -> String {
        String::from("Adding native libraries")
    }

    fn inputs(&self) -> Vec<PathBuf> {
        let mut inputs = vec![self.layout.unsigned_apk(&self.java_build)];
        inputs.extend(self.libs.iter().map(|(_, lib)| lib.clone()));
        inputs
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.output()]
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        let tmp = self.layout.tmp_dir();
        Ok(vec![Invocation::new(&self.aapt)
            .arg("add")
            .arg("-f")
            .arg(self.output())
            .args(self.libs.iter().map(|(abi, _)| self.staged(abi)))
            .current_dir(tmp)])
    }

    fn update(&self) -> Result<(), ToolError> {
        let tmp = self.layout.tmp_dir();
        fs::create_dir_all(&tmp).map_err(|e| io_error(&tmp, e))?;
        for (abi, lib) in &self.libs {
            let staged = tmp.join(self.staged(abi));
            if let Some(parent) = staged.parent() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
            fs::copy(lib, &staged).map_err(|e| io_error(lib, e))?;
        }
        let src = self.layout.unsigned_apk(&self.java_build);
        fs::copy(&src, self.output()).map_err(|e| io_error(&src, e))?;
        for cmd in self.commands()? {
            execute(&cmd)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SignApk {
    pub layout: Layout,
    pub input: PathBuf,
}

impl SignApk {
    pub fn output(&self) -> PathBuf {
        self.layout.tmp_dir().join("signed.apk")
    }
}

impl BuildStep for SignApk {
    fn name(&self) -> String {
        String::from("Signing APK")
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![self.input.clone(), self.layout.keystore()]
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.output()]
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        Ok(vec![Invocation::new("jarsigner")
            .arg("-keystore")
            .arg(self.layout.keystore())
            .args(["-storepass", KEYSTORE_PASSWORD])
            .args(["-keypass", KEYSTORE_PASSWORD])
            .arg("-signedjar")
            .arg(self.output())
            .arg(&self.input)
            .arg(KEY_ALIAS)])
    }
}

#[derive(Debug, Clone)]
pub struct AlignApk {
    pub layout: Layout,
    pub zipalign: PathBuf,
    pub input: PathBuf,
}

impl BuildStep for AlignApk {
    fn name(&self) -> String {
        String::from("Aligning APK")
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![self.input.clone()]
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.layout.final_apk()]
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        Ok(vec![Invocation::new(&self.zipalign)
            .arg("-f")
            .arg("4")
            .arg(&self.input)
            .arg(self.layout.final_apk())])
    }
}

/// Builds the unsigned HAP with hvigor.
#[derive(Debug, Clone)]
pub struct BuildHap {
    pub layout: Layout,
    pub hvigorw: PathBuf,
    pub libs: Vec<PathBuf>,
}

impl BuildStep for BuildHap {
    fn name(&self) -> String {
        format!("Building {} HAP", self.layout.target.app_name())
    }

    fn inputs(&self) -> Vec<PathBuf> {
        self.libs.clone()
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.layout.unsigned_hap()]
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        Ok(vec![Invocation::new(&self.hvigorw)
            .args(["assembleHap", "--mode", "module"])
            .args(["-p", "product=default", "-p", "buildMode=debug", "--no-daemon"])
            .current_dir(self.layout.hap_project())])
    }
}

#[derive(Debug, Clone)]
pub struct SignHap {
    pub layout: Layout,
    pub sign_tool: PathBuf,
    pub signing: HapSigning,
}

impl BuildStep for SignHap {
    fn name(&self) -> String {
        String::from("Signing HAP")
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![
            self.layout.unsigned_hap(),
            self.signing.keystore.clone(),
            self.signing.app_cert.clone(),
            self.signing.profile.clone(),
        ]
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.layout.final_hap()]
    }

    fn commands(&self) -> Result<Vec<Invocation>, ToolError> {
        let s = &self.signing;
        Ok(vec![Invocation::new("java")
            .arg("-jar")
            .arg(&self.sign_tool)
            .arg("sign-app")
            .arg("-keyAlias")
            .arg(&s.key_alias)
            .args(["-signAlg", "SHA256withECDSA", "-mode", "localSign"])
            .arg("-appCertFile")
            .arg(&s.app_cert)
            .arg("-profileFile")
            .arg(&s.profile)
            .arg("-inFile")
            .arg(self.layout.unsigned_hap())
            .arg("-keystoreFile")
            .arg(&s.keystore)
            .arg("-outFile")
            .arg(self.layout.final_hap())
            .arg("-keyPwd")
            .arg(&s.key_password)
            .arg("-keystorePwd")
            .arg(&s.keystore_password)])
    }
}

fn android_steps(
    config: &BuildConfig,
    sdk: &AndroidSdk,
    target: Target,
    natives: &[NativeBuild],
) -> Result<Vec<Box<dyn BuildStep>>, ToolError> {
    let layout = Layout::new(config, target);
    let tools = build_tools_dir(sdk)?;
    let add_libs = AddNativeLibs {
        layout: layout.clone(),
        java_build: sdk.java_build.clone(),
        aapt: find_tool("aapt", &[tools.as_path()])?,
        libs: natives.iter().map(|n| (n.abi.clone(), n.library())).collect(),
    };
    let sign = SignApk {
        layout: layout.clone(),
        input: add_libs.output(),
    };
    let align = AlignApk {
        layout: layout.clone(),
        zipalign: find_tool("zipalign", &[tools.as_path()])?,
        input: sign.output(),
    };
    let steps: Vec<Box<dyn BuildStep>> = vec![
        Box::new(CreateKeystore { layout: layout.clone() }),
        Box::new(BuildJava {
            layout,
            java_build: sdk.java_build.clone(),
        }),
        Box::new(add_libs),
        Box::new(sign),
        Box::new(align),
    ];
    Ok(steps)
}

fn ohos_steps(
    config: &BuildConfig,
    ohos: &OhosSdk,
    target: Target,
    natives: &[NativeBuild],
) -> Result<Vec<Box<dyn BuildStep>>, ToolError> {
    let layout = Layout::new(config, target);
    let hvigorw = find_tool("hvigorw", &[ohos.clt.join("hvigor/bin").as_path()])?;
    let sign_tool = ohos
        .clt
        .join("sdk/default/openharmony/toolchains/lib/hap-sign-tool.jar");
    let steps: Vec<Box<dyn BuildStep>> = vec![
        Box::new(BuildHap {
            layout: layout.clone(),
            hvigorw,
            libs: natives.iter().map(NativeBuild::library).collect(),
        }),
        Box::new(SignHap {
            layout,
            sign_tool,
            signing: ohos.signing.clone(),
        }),
    ];
    Ok(steps)
}

/// Every step needed to produce the package for `target` from scratch.
pub fn build_steps(config: &BuildConfig, target: Target) -> Result<Vec<Box<dyn BuildStep>>, ToolError> {
    let natives = config
        .abis
        .iter()
        .map(|abi| NativeBuild::new(config, abi, target))
        .collect::<Result<Vec<_>, _>>()?;
    let packaging = match &config.platform {
        Platform::Android(sdk) => android_steps(config, sdk, target, &natives)?,
        Platform::Ohos(ohos) => ohos_steps(config, ohos, target, &natives)?,
    };
    let mut steps: Vec<Box<dyn BuildStep>> = Vec::new();
    for native in natives {
        steps.push(Box::new(native));
    }
    steps.extend(packaging);
    Ok(steps)
}

/// Path of the finished package.
pub fn package_path(config: &BuildConfig, target: Target) -> PathBuf {
    let layout = Layout::new(config, target);
    match config.platform {
        Platform::Android(_) => layout.final_apk(),
        Platform::Ohos(_) => layout.final_hap(),
    }
}
