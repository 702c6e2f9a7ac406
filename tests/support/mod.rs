use scopelog::Log;

/// Prints through `log` on behalf of its caller.
#[inline(never)]
pub fn relay(log: &Log, message: &str) -> eyre::Result<()> {
    log.offset(1).print(message, &[])
}

/// Same as `relay` but attributes the line to itself.
#[inline(never)]
pub fn relay_here(log: &Log, message: &str) -> eyre::Result<()> {
    log.print(message, &[])
}

/// Two wrapper levels deep.
#[inline(never)]
pub fn relay_twice(log: &Log, message: &str) -> eyre::Result<()> {
    relay_outer(&log.offset(1), message)
}

#[inline(never)]
fn relay_outer(log: &Log, message: &str) -> eyre::Result<()> {
    log.offset(1).print(message, &[])
}
