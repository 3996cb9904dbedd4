//! Command-line surface mapping flags onto [`Settings`].

use clap::{Parser, Subcommand};
use golane_core::Settings;
use golane_exec::GoCommand;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "golane")]
#[command(about = "Provisions a Go SDK on demand and drives go build commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, env = "GOLANE_GO_VERSION", help = "Go SDK version to provision")]
    pub go_version: Option<String>,

    #[arg(long, global = true, env = "GOLANE_SDK_SITE", help = "Remote site hosting the SDK catalog and archives")]
    pub sdk_site: Option<String>,

    #[arg(long, global = true, env = "GOLANE_STORE_FOLDER", help = "Folder where downloaded SDKs are cached")]
    pub store_folder: Option<PathBuf>,

    #[arg(long, global = true, help = "Use this toolchain root instead of downloading")]
    pub go_root: Option<PathBuf>,

    #[arg(long, global = true, help = "GOPATH workspace folder")]
    pub go_path: Option<PathBuf>,

    #[arg(long, global = true, help = "Bootstrap toolchain root, exported as GOROOT_BOOTSTRAP")]
    pub go_root_bootstrap: Option<PathBuf>,

    #[arg(long, global = true, help = "Fail instead of downloading when the SDK is not cached")]
    pub disable_sdk_load: bool,

    #[arg(long, global = true, help = "Folder holding the Go sources to build")]
    pub sources: Option<PathBuf>,

    #[arg(long, global = true, help = "OS token for the SDK distribution name")]
    pub os: Option<String>,

    #[arg(long, global = true, help = "Architecture token for the SDK distribution name")]
    pub arch: Option<String>,

    #[arg(long, global = true, help = "OSX qualifier for the SDK distribution name")]
    pub osx_version: Option<String>,

    #[arg(long, global = true, help = "Cross-compilation target OS, exported as GOOS")]
    pub target_os: Option<String>,

    #[arg(long, global = true, help = "Cross-compilation target arch, exported as GOARCH")]
    pub target_arch: Option<String>,

    #[arg(long = "build-flag", global = true, allow_hyphen_values = true, help = "Extra flag passed to every go invocation, repeatable")]
    pub build_flags: Vec<String>,

    #[arg(short = 'v', long, global = true, help = "Log command lines and progress")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Do not delete the SDK archive after unpacking")]
    pub keep_sdk_archive: bool,

    #[arg(long, global = true, help = "Keep the partially unpacked folder when unpacking fails")]
    pub keep_unpacked_folder_on_error: bool,

    #[arg(long, global = true, help = "Relative path of a tool to run instead of bin/go")]
    pub use_go_tool: Option<String>,

    #[arg(long, global = true, help = "Let GOROOT, GOPATH, GOOS, GOARCH and GOROOT_BOOTSTRAP supply missing settings")]
    pub use_env_vars: bool,

    #[arg(long = "env", global = true, value_parser = parse_env_pair, value_name = "NAME=VALUE", help = "Extra environment variable for the subprocess, repeatable")]
    pub env: Vec<(String, String)>,

    #[arg(long, global = true, help = "Exact archive filename, bypassing the catalog lookup")]
    pub sdk_archive_name: Option<String>,

    #[arg(long, global = true, help = "Direct download URL, bypassing the catalog entirely")]
    pub sdk_download_url: Option<String>,

    #[arg(long, global = true, help = "Do not print the startup banner")]
    pub hide_banner: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Compile and install packages (go install)")]
    Install {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Compile packages (go build)")]
    Build {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Run package tests (go test)")]
    Test {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Remove object files (go clean)")]
    Clean {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Reformat package sources (go fmt)")]
    Fmt {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Report likely mistakes in packages (go vet)")]
    Vet {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Download and install packages (go get)")]
    Get {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Run code generators (go generate)")]
    Generate {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    #[command(about = "Run an arbitrary go subcommand")]
    Run {
        /// Subcommand name passed to the go tool.
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Cli {
    /// Build settings from defaults overridden by the given flags.
    #[must_use]
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(version) = &self.go_version {
            settings.go_version = version.clone();
        }
        if let Some(site) = &self.sdk_site {
            settings.sdk_site = site.clone();
        }
        if let Some(store) = &self.store_folder {
            settings.store_folder = store.clone();
        }
        if let Some(sources) = &self.sources {
            settings.sources = sources.clone();
        }
        settings.go_root = self.go_root.clone();
        settings.go_path = self.go_path.clone();
        settings.go_root_bootstrap = self.go_root_bootstrap.clone();
        settings.disable_sdk_load = self.disable_sdk_load;
        settings.os = self.os.clone();
        settings.arch = self.arch.clone();
        settings.osx_version = self.osx_version.clone();
        settings.target_os = self.target_os.clone();
        settings.target_arch = self.target_arch.clone();
        settings.build_flags = self.build_flags.clone();
        settings.verbose = self.verbose;
        settings.keep_sdk_archive = self.keep_sdk_archive;
        settings.keep_unpacked_folder_on_error = self.keep_unpacked_folder_on_error;
        settings.use_go_tool = self.use_go_tool.clone();
        settings.use_env_vars = self.use_env_vars;
        settings.env = self.env.clone();
        settings.sdk_archive_name = self.sdk_archive_name.clone();
        settings.sdk_download_url = self.sdk_download_url.clone();
        settings
    }

    /// The go subcommand to run and its tail arguments.
    #[must_use]
    pub fn go_command(&self) -> (GoCommand, Vec<String>) {
        match &self.command {
            Commands::Install { args } => (GoCommand::install(), args.clone()),
            Commands::Build { args } => (GoCommand::build(), args.clone()),
            Commands::Test { args } => (GoCommand::test(), args.clone()),
            Commands::Clean { args } => (GoCommand::clean(), args.clone()),
            Commands::Fmt { args } => (GoCommand::fmt(), args.clone()),
            Commands::Vet { args } => (GoCommand::vet(), args.clone()),
            Commands::Get { args } => (GoCommand::get(), args.clone()),
            Commands::Generate { args } => (GoCommand::generate(), args.clone()),
            Commands::Run { name, args } => (GoCommand::new(name.clone(), Vec::new()), args.clone()),
        }
    }
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}
