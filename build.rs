fn main() {
    // Only the ESP-IDF build needs the embuild sysenv; host builds (tests,
    // simulation) compile without the optional build dependency.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
