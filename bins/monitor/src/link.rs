//! Link command - change a link's administrative state.

use clap::{Args, ValueEnum};
use netwatch::netlink::rtnl::IFF_UP;
use netwatch::{Result, RtnlListener};

use crate::Silent;

#[derive(Clone, Copy, ValueEnum)]
pub enum LinkState {
    Up,
    Down,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Interface index
    #[arg(short, long)]
    pub ifindex: i32,

    /// Desired administrative state
    #[arg(value_enum)]
    pub state: LinkState,
}

pub async fn run(args: LinkArgs) -> Result<()> {
    let listener = RtnlListener::start(Silent).await?;

    match args.state {
        LinkState::Up => listener.set_link_flags(args.ifindex, IFF_UP).await,
        LinkState::Down => listener.unset_link_flags(args.ifindex, IFF_UP).await,
    }
}
