fn main() {
    devcast_studio_lib::run()
}
