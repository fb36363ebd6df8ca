pub mod books;
pub mod cart;

use bookmart_kernel::settings::Settings;
use bookmart_kernel::ModuleRegistry;
use bookmart_store::StoreHandle;

/// Register every storefront module with the registry, wiring each to
/// the injected store.
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings, store: &StoreHandle) {
    registry.register(books::create_module(settings, store));
    registry.register(cart::create_module(store));
}
