pub mod cat;
pub mod demo;
pub mod get;
pub mod init;
pub mod ls;
pub mod mv;
pub mod put;
pub mod rm;
pub mod stat;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Configure a backend and check that it is reachable
    Init(init::InitArgs),
    /// List files under a prefix
    Ls(ls::LsArgs),
    /// Show file metadata
    Stat(stat::StatArgs),
    /// Print a file to stdout
    Cat(cat::CatArgs),
    /// Upload a local file
    Put(put::PutArgs),
    /// Download a file to the local disk
    Get(get::GetArgs),
    /// Move or rename a file
    Mv(mv::MvArgs),
    /// Delete a file
    Rm(rm::RmArgs),
    /// Walk through every operation on a set of sample files
    Demo(demo::DemoArgs),
}
