mod app;
mod commands;
mod config;
mod connectivity;
mod downloads;
mod error;
mod permissions;
mod rendering;
mod shell;

use shell::ShellEvent;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut builder = tauri::Builder::default();

    // Must be registered first so a second launch exits before doing any work
    #[cfg(desktop)]
    {
        builder = builder.plugin(tauri_plugin_single_instance::init(|app, argv, _cwd| {
            log::info!("[SHELL] Second instance started with {:?}, raising window", argv);
            app::dispatch(app, ShellEvent::ShowRequested);
        }));
    }

    builder
        .plugin(tauri_plugin_store::Builder::default().build())
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_opener::init())
        .on_window_event(app::events::handle_window_event)
        .on_menu_event(app::menu::handle_menu_event)
        .invoke_handler(tauri::generate_handler![
            commands::web::request_permission,
            commands::web::request_media_permission,
            commands::web::show_web_notification,
            commands::web::open_external,
        ])
        .setup(|app| {
            app::init(app)?;
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
