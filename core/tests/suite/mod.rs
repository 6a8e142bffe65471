mod navigate;
