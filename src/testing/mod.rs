//! Shared fixtures for unit tests.

use crate::tree::FlatRecord;

/// Dashboard, an Administration group (Users, Roles) and a Reports group (Sales).
pub fn sample_menus() -> Vec<FlatRecord> {
    vec![
        FlatRecord::menu(1, None, 1, "Dashboard").with_route("/").with_icon("home"),
        FlatRecord::menu(2, None, 2, "Administration").with_icon("settings"),
        FlatRecord::menu(3, Some(2), 1, "Users").with_route("/users").with_permission("users.view"),
        FlatRecord::menu(4, Some(2), 2, "Roles").with_route("/roles").with_permission("roles.view"),
        FlatRecord::menu(5, None, 3, "Reports").with_permission("reports.view"),
        FlatRecord::menu(6, Some(5), 1, "Sales").with_route("/reports/sales"),
    ]
}

/// Documents > (Invoices > 2024, Contracts), Photos
pub fn sample_folders() -> Vec<FlatRecord> {
    vec![
        FlatRecord::folder(10, None, 1, "Documents"),
        FlatRecord::folder(11, Some(10), 1, "Invoices"),
        FlatRecord::folder(12, Some(11), 1, "2024"),
        FlatRecord::folder(13, Some(10), 2, "Contracts"),
        FlatRecord::folder(20, None, 2, "Photos"),
    ]
}
