pub mod add;
pub mod branch;
pub mod cat_file;
pub mod checkout;
pub mod cherry_pick;
pub mod clone;
pub mod commit;
pub mod config;
pub mod count_objects;
pub mod diff;
pub mod fetch;
pub mod init;
pub mod log;
pub mod ls_tree;
pub mod merge;
pub mod pull;
pub mod push;
pub mod rebase;
pub mod remote;
pub mod reset;
pub mod show;
pub mod show_ref;
pub mod stash;
pub mod status;
pub mod switch;
pub mod symbolic_ref;
pub mod tag;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty Lit repository or reinitialize an existing one
    Init(init::InitArgs),
    /// Clone a repository into a new directory
    Clone(clone::CloneArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Record changes to the repository
    Commit(commit::CommitArgs),
    /// Show the working tree status
    Status(status::StatusArgs),
    /// Show commit logs
    Log(log::LogArgs),
    /// Show various types of objects
    Show(show::ShowArgs),
    /// Show changes between commits, commit and working tree, etc
    Diff(diff::DiffArgs),
    /// List, create, or delete branches
    Branch(branch::BranchArgs),
    /// Switch branches or restore working tree files
    Checkout(checkout::CheckoutArgs),
    /// Switch branches
    Switch(switch::SwitchArgs),
    /// Join two or more development histories together
    Merge(merge::MergeArgs),
    /// Apply the changes introduced by an existing commit
    CherryPick(cherry_pick::CherryPickArgs),
    /// Reapply commits on top of another base tip
    Rebase(rebase::RebaseArgs),
    /// Download objects and refs from another repository
    Fetch(fetch::FetchArgs),
    /// Fetch from and integrate with another repository or a local branch
    Pull(pull::PullArgs),
    /// Update remote refs along with associated objects
    Push(push::PushArgs),
    /// Manage the set of tracked repositories
    Remote(remote::RemoteArgs),
    /// Stash the changes in a dirty working directory
    Stash(stash::StashArgs),
    /// Reset current HEAD to the specified state
    Reset(reset::ResetArgs),
    /// Create, list, or delete a tag object
    Tag(tag::TagArgs),
    /// Get and set repository or global options
    Config(config::ConfigArgs),
    /// List references in a local repository
    ShowRef(show_ref::ShowRefArgs),
    /// Read, modify and delete symbolic refs
    SymbolicRef(symbolic_ref::SymbolicRefArgs),
    /// List the contents of a tree object
    LsTree(ls_tree::LsTreeArgs),
    /// Provide content or type and size information for repository objects
    CatFile(cat_file::CatFileArgs),
    /// Count unpacked objects and their disk consumption
    CountObjects(count_objects::CountObjectsArgs),
}

impl Commands {
    /// The command name as used in error messages and config keys.
    pub fn command_name(&self) -> &str {
        match self {
            Commands::Init(_) => "init",
            Commands::Clone(_) => "clone",
            Commands::Add(_) => "add",
            Commands::Commit(_) => "commit",
            Commands::Status(_) => "status",
            Commands::Log(_) => "log",
            Commands::Show(_) => "show",
            Commands::Diff(_) => "diff",
            Commands::Branch(_) => "branch",
            Commands::Checkout(_) => "checkout",
            Commands::Switch(_) => "switch",
            Commands::Merge(_) => "merge",
            Commands::CherryPick(_) => "cherry-pick",
            Commands::Rebase(_) => "rebase",
            Commands::Fetch(_) => "fetch",
            Commands::Pull(_) => "pull",
            Commands::Push(_) => "push",
            Commands::Remote(_) => "remote",
            Commands::Stash(_) => "stash",
            Commands::Reset(_) => "reset",
            Commands::Tag(_) => "tag",
            Commands::Config(_) => "config",
            Commands::ShowRef(_) => "show-ref",
            Commands::SymbolicRef(_) => "symbolic-ref",
            Commands::LsTree(_) => "ls-tree",
            Commands::CatFile(_) => "cat-file",
            Commands::CountObjects(_) => "count-objects",
        }
    }
}

/// Discover and open the repository containing the current directory.
pub fn open_repo() -> Result<lit_repo::Repository> {
    Ok(lit_repo::Repository::discover(".")?)
}

/// Resolve a branch name, tag name, `HEAD`, or hex object ID to a commit.
/// Annotated tags are peeled to the commit they point at.
pub fn resolve_revision(repo: &lit_repo::Repository, rev: &str) -> Result<lit_hash::ObjectId> {
    use lit_ref::{RefName, RefStore};

    if rev == "HEAD" {
        return repo.head_oid()?.ok_or_else(|| lit_repo::RepoError::UnbornBranch("HEAD".to_string()).into());
    }

    let branch = RefName::new(format!("refs/heads/{rev}"))?;
    if let Some(oid) = repo.refs().resolve_to_oid(&branch)? {
        return Ok(oid);
    }

    if repo.tag_list()?.iter().any(|t| t.name == rev) {
        return Ok(repo.tag_peel_to_commit(rev)?);
    }

    if let Ok(oid) = lit_hash::ObjectId::from_hex(rev) {
        return Ok(oid);
    }

    Err(lit_repo::RepoError::RevisionNotFound(rev.to_string()).into())
}

pub fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Init(args) => init::run(&args),
        Commands::Clone(args) => clone::run(&args),
        Commands::Add(args) => add::run(&args),
        Commands::Commit(args) => commit::run(&args),
        Commands::Status(args) => status::run(&args),
        Commands::Log(args) => log::run(&args),
        Commands::Show(args) => show::run(&args),
        Commands::Diff(args) => diff::run(&args),
        Commands::Branch(args) => branch::run(&args),
        Commands::Checkout(args) => checkout::run(&args),
        Commands::Switch(args) => switch::run(&args),
        Commands::Merge(args) => merge::run(&args),
        Commands::CherryPick(args) => cherry_pick::run(&args),
        Commands::Rebase(args) => rebase::run(&args),
        Commands::Fetch(args) => fetch::run(&args),
        Commands::Pull(args) => pull::run(&args),
        Commands::Push(args) => push::run(&args),
        Commands::Remote(args) => remote::run(&args),
        Commands::Stash(args) => stash::run(&args),
        Commands::Reset(args) => reset::run(&args),
        Commands::Tag(args) => tag::run(&args),
        Commands::Config(args) => config::run(&args),
        Commands::ShowRef(args) => show_ref::run(&args),
        Commands::SymbolicRef(args) => symbolic_ref::run(&args),
        Commands::LsTree(args) => ls_tree::run(&args),
        Commands::CatFile(args) => cat_file::run(&args),
        Commands::CountObjects(args) => count_objects::run(&args),
    }
}
