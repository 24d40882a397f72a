mod install;
mod run;

pub use install::cmd_install;
pub use run::cmd_run;
