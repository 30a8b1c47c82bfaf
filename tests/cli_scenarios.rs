// tests/cli_scenarios.rs — Integration test: command line to desktop.ini
//
// Drives `run_with` through the public API with in-memory attribute,
// shell, prompt and environment collaborators, against real temp folders.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use foldericon::assign::IconAssignmentService;
use foldericon::ehm::AppError;
use foldericon::environment_provider::EnvironmentProvider;
use foldericon::icon_resource::IconReference;
use foldericon::platform::{FileAttributes, IndexPrompter, ShellNotifier};





const HIDDEN:  u32 = 0x02;
const SYSTEM:  u32 = 0x04;
const ARCHIVE: u32 = 0x20;





#[derive(Default)]
struct Attributes {
    bits: RefCell<HashMap<PathBuf, u32>>,
}

impl FileAttributes for Attributes {
    fn get_attributes(&self, path: &Path) -> Result<u32, AppError> {
        match self.bits.borrow().get(path) {
            Some(bits)             => Ok(*bits),
            None if path.exists()  => Ok(ARCHIVE),
            None => Err(AppError::AttributeRead {
                path:   path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn set_attributes(&self, path: &Path, bits: u32) -> Result<(), AppError> {
        self.bits.borrow_mut().insert(path.to_path_buf(), bits);
        Ok(())
    }
}





#[derive(Default)]
struct Shell {
    refreshed: RefCell<Vec<IconReference>>,
    fail:      bool,
    fallbacks: Cell<usize>,
}

impl ShellNotifier for Shell {
    fn refresh_folder_icon(&self, folder: &Path, icon: &IconReference) -> Result<(), AppError> {
        self.refreshed.borrow_mut().push(icon.clone());

        if self.fail {
            return Err(AppError::ShellRefreshFailed { folder: folder.to_path_buf(), code: -1 });
        }

        Ok(())
    }

    fn launch_fallback_refresh(&self) -> Result<(), AppError> {
        self.fallbacks.set(self.fallbacks.get() + 1);

        Err(AppError::FallbackLaunchFailed {
            program: "ie4uinit.exe".into(),
            source:  io::Error::from(io::ErrorKind::NotFound),
        })
    }
}





struct Prompter(i32);

impl IndexPrompter for Prompter {
    fn prompt_for_index(&self, _source: &Path) -> Result<i32, AppError> {
        Ok(self.0)
    }
}





#[derive(Default)]
struct Env(HashMap<String, String>);

impl EnvironmentProvider for Env {
    fn get_env_var(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  Harness
//
//  Runs one command line inside `cwd` and returns the exit result plus
//  everything written to the output stream.
//
////////////////////////////////////////////////////////////////////////////////

struct Harness {
    attrs:    Attributes,
    shell:    Shell,
    prompter: Prompter,
    env:      Env,
}

impl Harness {
    fn new() -> Self {
        Harness {
            attrs:    Attributes::default(),
            shell:    Shell::default(),
            prompter: Prompter(4),
            env:      Env::default(),
        }
    }

    fn run(&self, cwd: &Path, args: &[&str]) -> (Result<i32, AppError>, String) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let service           = IconAssignmentService::new(&self.attrs, &self.shell, &self.prompter, &self.env);
        let mut out           = Vec::new();

        let result = foldericon::run_with(&args, cwd, &self.env, &service, &mut out);
        (result, String::from_utf8_lossy(&out).into_owned())
    }
}





fn workspace() -> (TempDir, PathBuf) {
    let root   = TempDir::new().unwrap();
    let folder = root.path().join("Photos");
    fs::create_dir(&folder).unwrap();
    fs::create_dir(root.path().join("icons")).unwrap();
    fs::write(root.path().join("icons").join("camera.ico"), b"ico").unwrap();
    fs::write(root.path().join("icons").join("shell.dll"), b"dll").unwrap();
    (root, folder)
}





#[test]
fn assigns_relative_icon_against_working_directory() {
    let (root, folder) = workspace();
    let harness        = Harness::new();

    let (result, out) = harness.run(root.path(), &["/f", "Photos", "/i", "icons/../icons/camera.ico"]);

    assert_eq!(result.unwrap(), 0);

    let icon = root.path().join("icons").join("camera.ico");
    let ini  = fs::read_to_string(folder.join("desktop.ini")).unwrap();

    assert_eq!(ini, format!("IconResource={},0\r\n", icon.display()));
    assert!(out.starts_with("Folder icon updated for "));
    assert_eq!(*harness.shell.refreshed.borrow(), vec![IconReference::new(&icon, 0)]);
}

#[test]
fn dll_without_index_uses_prompted_value() {
    let (root, folder) = workspace();
    let harness        = Harness::new();
    let dll            = root.path().join("icons").join("shell.dll");

    let (result, _) = harness.run(root.path(), &["-f", folder.to_str().unwrap(), "-i", dll.to_str().unwrap()]);

    assert_eq!(result.unwrap(), 0);
    assert_eq!(
        fs::read_to_string(folder.join("desktop.ini")).unwrap(),
        format!("IconResource={},4\r\n", dll.display())
    );
}

#[test]
fn refresh_only_then_overlay_from_environment_default() {
    let (root, folder) = workspace();
    let mut harness    = Harness::new();
    harness.env.0.insert("FOLDERICON".into(), "A=+H +S".into());

    fs::write(folder.join("desktop.ini"), "[.ShellClassInfo]\r\nIconResource=../icons/shell.dll,2\r\n").unwrap();

    let (result, _) = harness.run(root.path(), &["/F", "Photos", "/A"]);

    assert_eq!(result.unwrap(), 0);
    assert_eq!(harness.shell.refreshed.borrow()[0].index, 2);

    let ini_bits = harness.attrs.bits.borrow()[&folder.join("desktop.ini")];
    assert_eq!(ini_bits, HIDDEN | SYSTEM | ARCHIVE);
}

#[test]
fn fallback_failure_exits_three_but_keeps_entry() {
    let (root, folder) = workspace();
    let mut harness    = Harness::new();
    harness.shell.fail = true;

    let (result, _) = harness.run(root.path(), &["/f", "Photos", "/i", "icons/camera.ico", "/n", "1"]);

    assert_eq!(result.unwrap(), 3);
    assert_eq!(harness.shell.fallbacks.get(), 1);
    assert!(fs::read_to_string(folder.join("desktop.ini")).unwrap().ends_with(",1\r\n"));
}

#[test]
fn no_arguments_shows_usage_and_fails() {
    let (root, _) = workspace();
    let (result, out) = Harness::new().run(root.path(), &[]);

    assert_eq!(result.unwrap(), 1);
    assert!(out.contains("/F folder"));
}

#[test]
fn unknown_switch_exits_two() {
    let (root, _) = workspace();
    let (result, out) = Harness::new().run(root.path(), &["/f", "Photos", "/z"]);

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(out.contains("/F folder"));
}

#[test]
fn index_without_icon_exits_one() {
    let (root, folder) = workspace();
    let (result, _) = Harness::new().run(root.path(), &["/f", "Photos", "/n", "3"]);

    assert_eq!(result.unwrap_err().exit_code(), 1);
    assert!(!folder.join("desktop.ini").exists());
}

#[test]
fn missing_config_on_refresh_reports_folder() {
    let (root, _) = workspace();
    let (result, _) = Harness::new().run(root.path(), &["/f", "Photos"]);

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::ConfigNotFound(_)));
    assert!(err.to_string().starts_with("Error:   desktop.ini not found in folder:"));
}
