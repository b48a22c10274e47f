/// Packages the speed lowpass plugin into host-loadable bundles. Usage:
///
///   cargo xtask bundle speed-lowpass --release
///
/// This compiles the plugin as a cdylib and writes `.vst3` and `.clap`
/// bundles to `target/bundled/`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
