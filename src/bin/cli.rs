//! memberpoint CLI
//!
//! Reads and writes MemberPoint records through the repository. Without
//! `--url` it runs against an in-process memory store, which is mostly
//! useful with the `demo` subcommand.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use memberpoint::{Config, KeySpace, MemberPoint, MemberPointRepository, SetOp, SortedSetOp, Store, StructureKind};
use tracing_subscriber::{fmt, EnvFilter};

/// memberpoint CLI
#[derive(Parser, Debug)]
#[command(name = "memberpoint-cli")]
#[command(about = "MemberPoint records over key-value store structures")]
#[command(version)]
struct Args {
    /// Logical database index
    #[arg(short, long, default_value = "0")]
    database: u32,

    /// Key prefix; each structure kind gets `<prefix>:<Kind>`
    #[arg(short, long, default_value = memberpoint::keys::DEFAULT_PREFIX)]
    namespace: String,

    /// Put every kind directly under the prefix (`<prefix>:MemberPoint:<id>`)
    #[arg(long)]
    shared: bool,

    /// Redis server URL; the in-process store is used when absent
    #[cfg(feature = "redis")]
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a record into one structure
    Put {
        kind: Kind,
        member_id: u32,
        point: i64,
    },

    /// Print everything one structure holds for a member
    Get { kind: Kind, member_id: u32 },

    /// Delete a member's key of one structure
    Del { kind: Kind, member_id: u32 },

    /// Set a time-to-live, in seconds, on a member's key
    Expire {
        kind: Kind,
        member_id: u32,
        seconds: u64,
    },

    /// Walk through every structure with sample records
    Demo,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Scalar,
    Hash,
    List,
    Set,
    SortedSet,
    Hyperloglog,
}

impl From<Kind> for StructureKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Scalar => StructureKind::Scalar,
            Kind::Hash => StructureKind::Hash,
            Kind::List => StructureKind::List,
            Kind::Set => StructureKind::Set,
            Kind::SortedSet => StructureKind::SortedSet,
            Kind::Hyperloglog => StructureKind::HyperLogLog,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,memberpoint=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let keyspace = if args.shared {
        KeySpace::shared(&args.namespace)
    } else {
        KeySpace::new(&args.namespace)
    };
    let config = Config::builder().database(args.database).keyspace(keyspace).build();

    if let Err(e) = dispatch(&args, config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "redis")]
fn dispatch(args: &Args, config: Config) -> memberpoint::Result<()> {
    match &args.url {
        Some(url) => {
            tracing::info!("Using redis store at {}", url);
            run(&MemberPointRepository::new(memberpoint::RedisStore::open(url)?, config)?, &args.command)
        }
        None => run(&MemberPointRepository::new(memberpoint::MemoryStore::new(), config)?, &args.command),
    }
}

#[cfg(not(feature = "redis"))]
fn dispatch(args: &Args, config: Config) -> memberpoint::Result<()> {
    run(&MemberPointRepository::new(memberpoint::MemoryStore::new(), config)?, &args.command)
}

fn run<S: Store>(repo: &MemberPointRepository<S>, command: &Commands) -> memberpoint::Result<()> {
    match *command {
        Commands::Put { kind, member_id, point } => {
            let written = repo.insert(kind.into(), &MemberPoint::new(member_id, point))?;
            println!("{}", written);
        }
        Commands::Get { kind, member_id } => {
            for record in repo.read(kind.into(), member_id)? {
                println!("{}\t{}", record.member_id, record.point);
            }
        }
        Commands::Del { kind, member_id } => {
            println!("{}", repo.delete_key(kind.into(), member_id)?);
        }
        Commands::Expire { kind, member_id, seconds } => {
            println!("{}", repo.expire_key(kind.into(), member_id, Duration::from_secs(seconds))?);
        }
        Commands::Demo => demo(repo)?,
    }
    Ok(())
}

fn demo<S: Store>(repo: &MemberPointRepository<S>) -> memberpoint::Result<()> {
    let alice = MemberPoint::new(100000, 10002);
    let bob = MemberPoint::new(100001, 10003);

    repo.scalar().insert(&alice, None)?;
    println!("scalar       {:?}", repo.scalar().find(alice.member_id)?);
    println!("scalar +5    {}", repo.scalar().increment(alice.member_id, 5)?);

    repo.hash().insert(&bob)?;
    println!("hash         {:?}", repo.hash().find_all(bob.member_id)?);

    repo.list().push_right_many(&[alice, MemberPoint::new(alice.member_id, 20000)])?;
    println!("list         {:?}", repo.list().range(alice.member_id)?);

    repo.set().add_many(&[alice, MemberPoint::new(alice.member_id, 10)])?;
    repo.set().add_many(&[bob, MemberPoint::new(bob.member_id, 10)])?;
    let ids = [alice.member_id, bob.member_id];
    println!("set union    {:?}", repo.set().combine(SetOp::Union, &ids)?);
    println!("set inter    {:?}", repo.set().combine(SetOp::Intersect, &ids)?);

    repo.sorted_set().add_many(&[alice, MemberPoint::new(alice.member_id, 1)])?;
    repo.sorted_set().add(&MemberPoint::new(bob.member_id, 1))?;
    repo.sorted_set().combine_and_store(SortedSetOp::Union, 200000, &ids)?;
    println!("zset union   {:?}", repo.sorted_set().range_by_rank_with_scores(200000, 0, -1)?);

    repo.hyperloglog().add_many(&[alice, bob, alice])?;
    println!("hll          {}", repo.hyperloglog().length(alice.member_id)?);

    let swapped = repo.transactions().conditional_set(&[MemberPoint::new(alice.member_id, 10007)], 0)?;
    println!("cas          {}", swapped);

    println!("script add   {}", repo.scripts().add_if_not_exist(&MemberPoint::new(300000, 1))?);
    println!("script add   {}", repo.scripts().add_if_not_exist(&MemberPoint::new(300000, 2))?);
    Ok(())
}
