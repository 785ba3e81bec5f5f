/// Installs a panic hook that logs through `tracing::error!` before handing
/// off to the default hook, so panics inside spawned tasks surface in the
/// same structured log stream as everything else (§10).
pub fn install() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(%info, "panic");
        default_hook(info);
    }));
}
