// Route handlers, grouped by audience:
// products - JSON catalog API (reads public, writes behind the admin gate)
// admin    - login, logout and the admin page
// site     - storefront pages and liveness
pub mod admin;
pub mod products;
pub mod site;
