use std::cmp::Ordering;
use std::env;
use std::process::Command;

// Defaults mirrored by `src/config.rs`
const DEFAULT_THRESHOLD: usize = 128;
const DEFAULT_SIMD_WIDTH: usize = 8;

// CPU features we want to detect
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    cfg_flag: &'static str,
    detected: bool,
}

impl CpuFeature {
    // Define priority order between CPU Features (Lowest number == Highest Priority)
    fn priority(&self) -> usize {
        match self.name {
            "avx2" => 0,
            "neon" => 1,
            _ => usize::MAX,
        }
    }

    // Groups all supported CPU features that have f64 kernels in this crate
    fn features() -> Vec<CpuFeature> {
        vec![
            CpuFeature {
                name: "avx2",
                cfg_flag: "avx2",
                detected: false,
            },
            CpuFeature {
                name: "neon",
                cfg_flag: "neon",
                detected: false,
            },
        ]
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Feature detection trait to make implementations more modular
trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

// Linux CPU feature detector
struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let contents = cpuinfo.to_lowercase();
            for feature in features.iter_mut() {
                feature.detected = match feature.name {
                    // aarch64 kernels report Advanced SIMD as "asimd"
                    "neon" => contents.contains("neon") || contents.contains("asimd"),
                    name => contents.contains(name),
                };
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

// macOS CPU feature detector
struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                match feature.name {
                    "avx2" => feature.detected = contents.contains("hw.optional.avx2_0: 1"),
                    "neon" => feature.detected = contents.contains("hw.optional.neon: 1"),
                    _ => {}
                }
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }
    }

    fn apply(features: &mut [CpuFeature]) {
        features.sort();

        // Highest priority detected feature wins, otherwise the portable kernels are used
        let cfg_flag = features
            .iter()
            .find(|cpu_feature| cpu_feature.detected)
            .map(|cpu_feature| cpu_feature.cfg_flag)
            .unwrap_or("fallback");

        println!("cargo:rustc-cfg={cfg_flag}");

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

// Reads a dispatch knob from the environment and forwards it to the crate
// through `cargo:rustc-env`, falling back to the default when unset.
fn forward_knob(var: &str, default: usize, must_be_positive: bool) {
    println!("cargo:rerun-if-env-changed={var}");

    let value = match env::var(var) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if must_be_positive && value == 0 => {
                panic!("{var} must be greater than zero")
            }
            Ok(value) => value,
            Err(err) => panic!("{var}={raw:?} is not a valid unsigned integer: {err}"),
        },
        Err(_) => default,
    };

    println!("cargo:rustc-env={var}={value}");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    forward_knob("VML_DISPATCH_THRESHOLD", DEFAULT_THRESHOLD, false);
    forward_knob("VML_DISPATCH_SIMD_WIDTH", DEFAULT_SIMD_WIDTH, true);

    if env::var_os("CARGO_FEATURE_AOCL").is_some() {
        println!("cargo:rustc-link-lib=dylib=amdlibm");
        if let Ok(dir) = env::var("AOCL_LIB_DIR") {
            println!("cargo:rustc-link-search=native={dir}");
        }
        println!("cargo:rerun-if-env-changed=AOCL_LIB_DIR");
    }

    let mut features = CpuFeature::features();

    // Only run CPU detection for native builds
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    if host == target {
        PlatformDetector::detect_cpu_features(&mut features);
    }

    PlatformDetector::apply(&mut features);
}
